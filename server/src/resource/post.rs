use crate::model::post::Post;
use crate::schema::{comment, post, user};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Queryable, Serialize)]
pub struct PostInfo {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
}

impl PostInfo {
    /// Every post with its author, oldest first.
    pub fn all(conn: &mut SqliteConnection) -> QueryResult<Vec<Self>> {
        post::table
            .inner_join(user::table)
            .select((post::id, post::title, post::content, user::username))
            .order_by(post::id)
            .load(conn)
    }

    pub fn new(conn: &mut SqliteConnection, post: Post) -> QueryResult<Self> {
        let author: String = user::table
            .find(post.user_id)
            .select(user::username)
            .first(conn)?;
        Ok(Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author,
        })
    }
}

#[derive(Debug, Queryable, Serialize)]
pub struct CommentInfo {
    pub id: i32,
    pub content: String,
    pub author: String,
}

impl CommentInfo {
    /// Comments on `post_id` in the order they were made.
    pub fn for_post(conn: &mut SqliteConnection, post_id: i32) -> QueryResult<Vec<Self>> {
        comment::table
            .inner_join(user::table)
            .select((comment::id, comment::content, user::username))
            .filter(comment::post_id.eq(post_id))
            .order_by(comment::id)
            .load(conn)
    }
}
