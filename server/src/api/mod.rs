mod error;
mod extract;
mod home;
mod middleware;
mod post;
mod survey;
mod user;
mod weather;

pub use error::{ApiError, ApiResult};

use crate::app::AppState;
use crate::auth::{Client, CurrentUser};
use crate::flash::{self, Flash};
use crate::model::enums::ResourceType;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tower_http::trace::TraceLayer;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .merge(home::routes())
        .merge(user::routes())
        .merge(post::routes())
        .merge(survey::routes())
        .merge(weather::routes())
        .fallback(fallback)
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Everything a page needs to be drawn. Page-specific fields are flattened in next
/// to the common ones.
#[derive(Serialize)]
struct Page<T> {
    title: Option<String>,
    user: Option<CurrentUser>,
    flashes: Vec<Flash>,
    #[serde(flatten)]
    content: T,
}

/// Renders a page, consuming any pending flash messages.
fn render<T: Serialize>(jar: CookieJar, client: Client, title: Option<String>, content: T) -> Response {
    let (jar, flashes) = flash::take(jar);
    let page = Page {
        title,
        user: client.user,
        flashes,
        content,
    };
    (jar, Json(page)).into_response()
}

fn redirect(jar: CookieJar, uri: &str) -> Response {
    (jar, Redirect::to(uri)).into_response()
}

async fn fallback() -> ApiError {
    ApiError::NotFound(ResourceType::Page)
}
