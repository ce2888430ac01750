use crate::auth::CurrentUser;
use crate::model::session::NewUserSession;
use crate::schema::{user, user_session};
use axum_extra::extract::cookie::{Cookie, SameSite};
use diesel::prelude::*;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

/// How long a "remember me" session cookie persists in the browser.
const REMEMBER_DURATION: time::Duration = time::Duration::days(365);

/// Starts a new session for `user_id` and returns its opaque identifier.
/// How long the session lasts is decided by its cookie, see [`cookie`].
pub fn create(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<String> {
    let session_id = Uuid::new_v4().hyphenated().to_string();
    let new_session = NewUserSession {
        id: &session_id,
        user_id,
    };
    diesel::insert_into(user_session::table)
        .values(new_session)
        .execute(conn)?;
    Ok(session_id)
}

/// Looks up the user owning `session_id`. Malformed or unknown identifiers yield [`None`].
pub fn authenticate(conn: &mut SqliteConnection, session_id: &str) -> QueryResult<Option<CurrentUser>> {
    if Uuid::parse_str(session_id).is_err() {
        return Ok(None);
    }

    user_session::table
        .inner_join(user::table)
        .select((user::id, user::username))
        .filter(user_session::id.eq(session_id))
        .first(conn)
        .optional()
}

pub fn delete(conn: &mut SqliteConnection, session_id: &str) -> QueryResult<()> {
    diesel::delete(user_session::table.find(session_id)).execute(conn)?;
    Ok(())
}

/// Cookie carrying `session_id`. Without `remember` it expires when the browser closes.
pub fn cookie(session_id: String, remember: bool) -> Cookie<'static> {
    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    match remember {
        true => cookie.max_age(REMEMBER_DURATION).build(),
        false => cookie.build(),
    }
}

/// Cookie that clears the session cookie from the browser.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}
