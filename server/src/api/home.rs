use crate::api::{self, ApiResult};
use crate::app::AppState;
use crate::auth::Client;
use crate::resource::post::PostInfo;
use axum::extract::{Extension, State};
use axum::response::Response;
use axum::{Router, routing};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", routing::get(home))
        .route("/home", routing::get(home))
}

#[derive(Serialize)]
struct HomePage {
    posts: Vec<PostInfo>,
}

/// Lists every post.
async fn home(State(state): State<AppState>, Extension(client): Extension<Client>, jar: CookieJar) -> ApiResult<Response> {
    let posts = PostInfo::all(&mut *state.get_connection()?)?;
    Ok(api::render(jar, client, None, HomePage { posts }))
}
