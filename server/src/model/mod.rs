pub mod comment;
pub mod enums;
pub mod post;
pub mod session;
pub mod survey;
pub mod user;
