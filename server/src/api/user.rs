use crate::api::error::{self, ApiResult};
use crate::api::extract::{Form, Query};
use crate::app::AppState;
use crate::auth::session::{self, SESSION_COOKIE};
use crate::auth::{Client, password};
use crate::flash::{self, Category};
use crate::form::{FormErrors, FormView};
use crate::model::enums::ResourceType;
use crate::model::user::NewUser;
use crate::schema::user;
use crate::api;
use axum::extract::{Extension, State};
use axum::response::Response;
use axum::{Router, routing};
use axum_extra::extract::cookie::CookieJar;
use diesel::dsl::exists;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", routing::get(registration_page).post(register))
        .route("/login", routing::get(login_page).post(login))
        .route("/logout", routing::get(logout))
}

#[derive(Default, Deserialize, Validate)]
#[serde(default)]
struct RegistrationForm {
    #[validate(
        custom(function = "crate::form::required"),
        length(min = 2, max = 20, message = "Field must be between 2 and 20 characters long.")
    )]
    username: String,
    #[validate(custom(function = "crate::form::required"), email(message = "Invalid email address."))]
    email: String,
    #[validate(custom(function = "crate::form::required"))]
    password: String,
    #[validate(must_match(other = "password", message = "Field must be equal to password."))]
    confirm_password: String,
}

/// Registration fields echoed back to the page. Passwords are never sent back.
#[derive(Default, Serialize)]
struct RegistrationValues {
    username: String,
    email: String,
}

impl From<RegistrationForm> for RegistrationValues {
    fn from(form: RegistrationForm) -> Self {
        Self {
            username: form.username,
            email: form.email,
        }
    }
}

async fn registration_page(Extension(client): Extension<Client>, jar: CookieJar) -> Response {
    if client.is_authenticated() {
        return api::redirect(jar, "/home");
    }
    let view = FormView::fresh(RegistrationValues::default());
    api::render(jar, client, Some(String::from("Register")), view)
}

/// Creates a new account. Clients that are already logged in are sent home.
async fn register(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    jar: CookieJar,
    Form(form): Form<RegistrationForm>,
) -> ApiResult<Response> {
    if client.is_authenticated() {
        return Ok(api::redirect(jar, "/home"));
    }

    let mut errors = FormErrors::validate(&form);
    let mut conn = state.get_connection()?;
    if !errors.contains("username") {
        let taken: bool = diesel::select(exists(user::table.filter(user::username.eq(&form.username)))).get_result(&mut conn)?;
        if taken {
            errors.add("username", "That username is taken. Please choose a different one.");
        }
    }
    if !errors.contains("email") {
        let taken: bool = diesel::select(exists(user::table.filter(user::email.eq(&form.email)))).get_result(&mut conn)?;
        if taken {
            errors.add("email", "That email is taken. Please choose a different one.");
        }
    }
    if !errors.is_empty() {
        let view = FormView::new(RegistrationValues::from(form), errors);
        return Ok(api::render(jar, client, Some(String::from("Register")), view));
    }

    let password_hash = password::hash_password(&state.config, &form.password)?;
    let new_user = NewUser {
        username: &form.username,
        email: &form.email,
        password_hash: &password_hash,
    };
    let result = diesel::insert_into(user::table).values(new_user).execute(&mut conn);
    error::map_unique_violation(result, ResourceType::User)?;
    tracing::info!("Registered user {}", form.username);

    let jar = flash::push(jar, Category::Success, "Your account has been created! You are now able to log in");
    Ok(api::redirect(jar, "/login"))
}

#[derive(Default, Deserialize, Validate)]
#[serde(default)]
struct LoginForm {
    #[validate(custom(function = "crate::form::required"), email(message = "Invalid email address."))]
    email: String,
    #[validate(custom(function = "crate::form::required"))]
    password: String,
    remember: Option<String>,
}

impl LoginForm {
    /// Checkboxes are only submitted when ticked.
    fn remember(&self) -> bool {
        self.remember.as_deref().is_some_and(|value| !value.is_empty() && value != "false")
    }
}

#[derive(Default, Serialize)]
struct LoginValues {
    email: String,
    remember: bool,
}

#[derive(Deserialize)]
struct LoginParams {
    next: Option<String>,
}

async fn login_page(Extension(client): Extension<Client>, jar: CookieJar) -> Response {
    if client.is_authenticated() {
        return api::redirect(jar, "/home");
    }
    let view = FormView::fresh(LoginValues::default());
    api::render(jar, client, Some(String::from("Login")), view)
}

/// Starts a session when the email and password match a registered user.
async fn login(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    jar: CookieJar,
    Query(params): Query<LoginParams>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    if client.is_authenticated() {
        return Ok(api::redirect(jar, "/home"));
    }

    let errors = FormErrors::validate(&form);
    if errors.is_empty() {
        let mut conn = state.get_connection()?;
        let credentials: Option<(i32, String)> = user::table
            .select((user::id, user::password_hash))
            .filter(user::email.eq(&form.email))
            .first(&mut conn)
            .optional()?;

        // For security reasons, don't give any indication to the user if it was the password
        // or the email that was incorrect.
        let (user_id, password_hash) = credentials.unzip();
        let verified = password::verify_login(&state.config, password_hash.as_deref(), &form.password);
        if let Some(user_id) = user_id.filter(|_| verified) {
            let remember = form.remember();
            let session_id = session::create(&mut conn, user_id)?;
            let jar = jar.add(session::cookie(session_id, remember));
            return Ok(api::redirect(jar, redirect_target(params.next.as_deref())));
        }
    }

    let jar = match errors.is_empty() {
        true => flash::push(jar, Category::Danger, "Login Unsuccessful. Please check email and password"),
        false => jar,
    };
    let values = LoginValues {
        remember: form.remember(),
        email: form.email,
    };
    Ok(api::render(jar, client, Some(String::from("Login")), FormView::new(values, errors)))
}

/// Ends the current session, if any.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        session::delete(&mut *state.get_connection()?, cookie.value())?;
    }
    let jar = jar.remove(session::removal_cookie());
    Ok(api::redirect(jar, "/home"))
}

/// Only same-site paths are followed after login so the parameter can't bounce users elsewhere.
fn redirect_target(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/home",
    }
}

#[cfg(test)]
mod test {
    use super::redirect_target;
    use crate::auth::session::SESSION_COOKIE;
    use crate::schema::{user, user_session};
    use crate::test::*;
    use axum::http::StatusCode;
    use diesel::prelude::*;

    #[test]
    fn redirect_targets() {
        assert_eq!(redirect_target(None), "/home");
        assert_eq!(redirect_target(Some("/post/new")), "/post/new");
        assert_eq!(redirect_target(Some("https://example.com")), "/home");
        assert_eq!(redirect_target(Some("//example.com")), "/home");
        assert_eq!(redirect_target(Some("/\\example.com")), "/home");
    }

    #[tokio::test]
    async fn register_then_login() {
        let state = test_state(None);
        let server = test_server(&state);

        let response = server.post("/register").form(&registration_form(TEST_USERNAME, TEST_EMAIL)).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");

        let page: serde_json::Value = server.get("/login").await.json();
        assert_eq!(page["flashes"][0]["category"], "success");

        let mut conn = state.get_connection().unwrap();
        let password_hash: String = user::table
            .select(user::password_hash)
            .filter(user::username.eq(TEST_USERNAME))
            .first(&mut conn)
            .unwrap();
        assert_ne!(password_hash, TEST_PASSWORD);
        drop(conn);

        log_in(&server).await;
        let page: serde_json::Value = server.get("/home").await.json();
        assert_eq!(page["user"]["username"], TEST_USERNAME);

        let mut conn = state.get_connection().unwrap();
        let session_count: i64 = user_session::table.count().get_result(&mut conn).unwrap();
        assert_eq!(session_count, 1);
        drop(conn);

        // Logged in clients are sent away from the login and registration pages
        server.get("/login").await.assert_status(StatusCode::SEE_OTHER);
        server.get("/register").await.assert_status(StatusCode::SEE_OTHER);

        let response = server.get("/logout").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/home");

        let page: serde_json::Value = server.get("/home").await.json();
        assert!(page["user"].is_null());

        let mut conn = state.get_connection().unwrap();
        let session_count: i64 = user_session::table.count().get_result(&mut conn).unwrap();
        assert_eq!(session_count, 0);
    }

    #[tokio::test]
    async fn login_follows_next() {
        let state = test_state(None);
        create_test_user(&state, TEST_USERNAME, TEST_EMAIL);
        let server = test_server(&state);

        let response = server
            .post("/login?next=%2Fpost%2Fnew")
            .form(&[("email", TEST_EMAIL), ("password", TEST_PASSWORD), ("remember", "y")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/post/new");
    }

    #[tokio::test]
    async fn remember_me() {
        let state = test_state(None);
        create_test_user(&state, TEST_USERNAME, TEST_EMAIL);

        let response = test_server(&state)
            .post("/login")
            .form(&[("email", TEST_EMAIL), ("password", TEST_PASSWORD), ("remember", "y")])
            .await;
        assert_eq!(response.cookie(SESSION_COOKIE).max_age(), Some(time::Duration::days(365)));

        let response = test_server(&state)
            .post("/login")
            .form(&[("email", TEST_EMAIL), ("password", TEST_PASSWORD)])
            .await;
        assert_eq!(response.cookie(SESSION_COOKIE).max_age(), None);

        let mut conn = state.get_connection().unwrap();
        let session_count: i64 = user_session::table.count().get_result(&mut conn).unwrap();
        assert_eq!(session_count, 2);
    }

    #[tokio::test]
    async fn wrong_password() {
        let state = test_state(None);
        create_test_user(&state, TEST_USERNAME, TEST_EMAIL);
        let server = test_server(&state);

        let response = server
            .post("/login")
            .form(&[("email", TEST_EMAIL), ("password", "wrong_password")])
            .await;
        response.assert_status_ok();

        let page: serde_json::Value = response.json();
        assert_eq!(page["flashes"][0]["category"], "danger");
        assert_eq!(page["flashes"][0]["message"], "Login Unsuccessful. Please check email and password");
        assert_eq!(page["form"]["email"], TEST_EMAIL);
        assert!(page["user"].is_null());

        let response = server
            .post("/login")
            .form(&[("email", "nobody@example.com"), ("password", TEST_PASSWORD)])
            .await;
        let page: serde_json::Value = response.json();
        assert_eq!(page["flashes"][0]["category"], "danger");
    }

    #[tokio::test]
    async fn registration_errors() {
        let state = test_state(None);
        create_test_user(&state, TEST_USERNAME, TEST_EMAIL);
        let server = test_server(&state);

        let response = server.post("/register").form(&registration_form(TEST_USERNAME, TEST_EMAIL)).await;
        response.assert_status_ok();
        let page: serde_json::Value = response.json();
        assert_eq!(page["errors"]["username"][0], "That username is taken. Please choose a different one.");
        assert_eq!(page["errors"]["email"][0], "That email is taken. Please choose a different one.");
        assert!(page["form"].get("password").is_none());

        let response = server
            .post("/register")
            .form(&[
                ("username", "x"),
                ("email", "not an email"),
                ("password", "one"),
                ("confirm_password", "two"),
            ])
            .await;
        let page: serde_json::Value = response.json();
        assert_eq!(page["errors"]["username"][0], "Field must be between 2 and 20 characters long.");
        assert_eq!(page["errors"]["email"][0], "Invalid email address.");
        assert_eq!(page["errors"]["confirm_password"][0], "Field must be equal to password.");

        let response = server.post("/register").form(&[("username", "")]).await;
        let page: serde_json::Value = response.json();
        assert_eq!(page["errors"]["email"], serde_json::json!(["This field is required."]));
        assert_eq!(page["errors"]["password"], serde_json::json!(["This field is required."]));

        let mut conn = state.get_connection().unwrap();
        let user_count: i64 = user::table.count().get_result(&mut conn).unwrap();
        assert_eq!(user_count, 1);
    }

    fn registration_form<'a>(username: &'a str, email: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("username", username),
            ("email", email),
            ("password", TEST_PASSWORD),
            ("confirm_password", TEST_PASSWORD),
        ]
    }
}
