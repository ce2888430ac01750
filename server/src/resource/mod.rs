//! Read-side views of stored resources, shaped for rendering.

pub mod post;
pub mod survey;
