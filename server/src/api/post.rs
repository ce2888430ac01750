use crate::api::extract::{Form, Path};
use crate::api::{self, ApiError, ApiResult, middleware};
use crate::app::AppState;
use crate::auth::Client;
use crate::flash::{self, Category};
use crate::form::{FormErrors, FormView};
use crate::model::comment::NewComment;
use crate::model::enums::ResourceType;
use crate::model::post::{NewPost, Post};
use crate::resource::post::{CommentInfo, PostInfo};
use crate::schema::{comment, post};
use axum::extract::{Extension, State};
use axum::response::Response;
use axum::{Router, routing};
use axum_extra::extract::cookie::CookieJar;
use diesel::dsl::exists;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub fn routes() -> Router<AppState> {
    let restricted = Router::new()
        .route("/post/new", routing::get(new_post_page).post(create))
        .route("/post/{id}/comment", routing::post(add_comment))
        .route_layer(axum::middleware::from_fn(middleware::login_required));
    Router::new()
        .route("/post/{id}", routing::get(post_page))
        .merge(restricted)
}

#[derive(Default, Deserialize, Serialize, Validate)]
#[serde(default)]
struct PostForm {
    #[validate(custom(function = "crate::form::required"))]
    title: String,
    #[validate(custom(function = "crate::form::required"))]
    content: String,
}

#[derive(Default, Deserialize, Serialize, Validate)]
#[serde(default)]
struct CommentForm {
    #[validate(custom(function = "crate::form::required"))]
    content: String,
}

async fn new_post_page(Extension(client): Extension<Client>, jar: CookieJar) -> Response {
    let view = FormView::fresh(PostForm::default());
    api::render(jar, client, Some(String::from("New Post")), view)
}

async fn create(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> ApiResult<Response> {
    let errors = FormErrors::validate(&form);
    let Some(user_id) = client.id().filter(|_| errors.is_empty()) else {
        return Ok(api::render(jar, client, Some(String::from("New Post")), FormView::new(form, errors)));
    };

    let new_post = NewPost {
        user_id,
        title: &form.title,
        content: &form.content,
    };
    let post_id: i32 = diesel::insert_into(post::table)
        .values(new_post)
        .returning(post::id)
        .get_result(&mut state.get_connection()?)?;
    tracing::info!("Created post {post_id}");

    let jar = flash::push(jar, Category::Success, "Your post has been created!");
    Ok(api::redirect(jar, "/home"))
}

#[derive(Serialize)]
struct PostPage {
    post: PostInfo,
    comments: Vec<CommentInfo>,
    #[serde(flatten)]
    comment_form: FormView<CommentForm>,
}

async fn post_page(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    jar: CookieJar,
    Path(post_id): Path<i32>,
) -> ApiResult<Response> {
    let mut conn = state.get_connection()?;
    let post = post::table
        .find(post_id)
        .select(Post::as_select())
        .first(&mut conn)
        .optional()?
        .ok_or(ApiError::NotFound(ResourceType::Post))?;
    let post = PostInfo::new(&mut conn, post)?;
    let comments = CommentInfo::for_post(&mut conn, post_id)?;
    drop(conn);

    let title = Some(post.title.clone());
    let page = PostPage {
        post,
        comments,
        comment_form: FormView::fresh(CommentForm::default()),
    };
    Ok(api::render(jar, client, title, page))
}

/// Adds a comment and returns to the post. An empty comment is silently discarded.
async fn add_comment(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    jar: CookieJar,
    Path(post_id): Path<i32>,
    Form(form): Form<CommentForm>,
) -> ApiResult<Response> {
    let mut conn = state.get_connection()?;
    let post_exists: bool = diesel::select(exists(post::table.find(post_id))).get_result(&mut conn)?;
    if !post_exists {
        return Err(ApiError::NotFound(ResourceType::Post));
    }

    let post_url = format!("/post/{post_id}");
    let Some(user_id) = client.id().filter(|_| FormErrors::validate(&form).is_empty()) else {
        return Ok(api::redirect(jar, &post_url));
    };

    let new_comment = NewComment {
        user_id,
        post_id,
        content: &form.content,
    };
    diesel::insert_into(comment::table).values(new_comment).execute(&mut conn)?;

    let jar = flash::push(jar, Category::Success, "Your comment has been added!");
    Ok(api::redirect(jar, &post_url))
}
