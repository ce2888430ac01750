use crate::schema::{survey, survey_option};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

#[derive(Insertable)]
#[diesel(table_name = survey)]
#[diesel(check_for_backend(Sqlite))]
pub struct NewSurvey<'a> {
    pub question: &'a str,
}

#[derive(Debug, Identifiable, Queryable, Selectable)]
#[diesel(table_name = survey)]
#[diesel(check_for_backend(Sqlite))]
pub struct Survey {
    pub id: i32,
    pub question: String,
}

/// New options always start with zero votes.
#[derive(Insertable)]
#[diesel(table_name = survey_option)]
#[diesel(check_for_backend(Sqlite))]
pub struct NewSurveyOption<'a> {
    pub survey_id: i32,
    pub option_text: &'a str,
}

#[derive(Debug, Associations, Identifiable, Queryable, Selectable)]
#[diesel(belongs_to(Survey))]
#[diesel(table_name = survey_option)]
#[diesel(check_for_backend(Sqlite))]
pub struct SurveyOption {
    pub id: i32,
    pub survey_id: i32,
    pub option_text: String,
    pub votes: i32,
}
