pub mod password;
pub mod session;

use diesel::Queryable;
use serde::Serialize;

/// The user a request is made on behalf of, if any.
#[derive(Debug, Clone, Default)]
pub struct Client {
    pub user: Option<CurrentUser>,
}

impl Client {
    pub fn new(user: Option<CurrentUser>) -> Self {
        Self { user }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn id(&self) -> Option<i32> {
        self.user.as_ref().map(|user| user.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}
