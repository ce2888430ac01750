use crate::api::ApiResult;
use crate::app::AppState;
use crate::auth::session::{self, SESSION_COOKIE};
use crate::auth::Client;
use crate::flash::{self, Category};
use axum::extract::{Extension, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use url::form_urlencoded;

/// Identifies the client from its session cookie and attaches it to the request.
/// Requests without a valid session are treated as anonymous.
pub async fn auth(State(state): State<AppState>, jar: CookieJar, mut request: Request, next: Next) -> ApiResult<Response> {
    let user = match jar.get(SESSION_COOKIE) {
        Some(cookie) => {
            let mut conn = state.get_connection()?;
            session::authenticate(&mut conn, cookie.value())?
        }
        None => None,
    };

    request.extensions_mut().insert(Client::new(user));
    Ok(next.run(request).await)
}

/// Sends anonymous clients to the login page, remembering where they were headed.
pub async fn login_required(
    Extension(client): Extension<Client>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if client.is_authenticated() {
        return next.run(request).await;
    }

    let next_path: String = form_urlencoded::byte_serialize(request.uri().path().as_bytes()).collect();
    let jar = flash::push(jar, Category::Info, "Please log in to access this page.");
    (jar, Redirect::to(&format!("/login?next={next_path}"))).into_response()
}
