use crate::schema::user_session;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

#[derive(Insertable)]
#[diesel(table_name = user_session)]
#[diesel(check_for_backend(Sqlite))]
pub struct NewUserSession<'a> {
    pub id: &'a str,
    pub user_id: i32,
}
