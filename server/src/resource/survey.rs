use crate::model::survey::{Survey, SurveyOption};
use crate::schema::{survey, survey_option};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SurveyInfo {
    pub id: i32,
    pub question: String,
    pub options: Vec<OptionInfo>,
}

#[derive(Debug, Serialize)]
pub struct OptionInfo {
    pub id: i32,
    pub option_text: String,
    pub votes: i32,
}

impl From<SurveyOption> for OptionInfo {
    fn from(option: SurveyOption) -> Self {
        Self {
            id: option.id,
            option_text: option.option_text,
            votes: option.votes,
        }
    }
}

impl SurveyInfo {
    pub fn new(conn: &mut SqliteConnection, survey: Survey) -> QueryResult<Self> {
        Self::new_batch(conn, vec![survey])?
            .pop()
            .ok_or(diesel::result::Error::NotFound)
    }

    /// Every survey with its options, oldest first.
    pub fn all(conn: &mut SqliteConnection) -> QueryResult<Vec<Self>> {
        let surveys: Vec<Survey> = survey::table.select(Survey::as_select()).order_by(survey::id).load(conn)?;
        Self::new_batch(conn, surveys)
    }

    fn new_batch(conn: &mut SqliteConnection, surveys: Vec<Survey>) -> QueryResult<Vec<Self>> {
        let options = SurveyOption::belonging_to(&surveys)
            .select(SurveyOption::as_select())
            .order_by(survey_option::id)
            .load::<SurveyOption>(conn)?
            .grouped_by(&surveys);

        Ok(surveys
            .into_iter()
            .zip(options)
            .map(|(survey, options)| Self {
                id: survey.id,
                question: survey.question,
                options: options.into_iter().map(OptionInfo::from).collect(),
            })
            .collect())
    }

    /// Whether `option_id` is one of this survey's choices.
    pub fn has_option(&self, option_id: i32) -> bool {
        self.options.iter().any(|option| option.id == option_id)
    }
}
