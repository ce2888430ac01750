use crate::schema::comment;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

#[derive(Insertable)]
#[diesel(table_name = comment)]
#[diesel(check_for_backend(Sqlite))]
pub struct NewComment<'a> {
    pub user_id: i32,
    pub post_id: i32,
    pub content: &'a str,
}
