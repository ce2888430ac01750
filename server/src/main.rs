#![warn(clippy::pedantic)]
// Gives warnings for every diesel::prelude::* import
#![allow(clippy::wildcard_imports)]
// Too subjective
#![allow(clippy::similar_names, clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::match_bool)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::doc_markdown)]

mod api;
mod app;
mod auth;
mod config;
mod db;
mod error;
mod flash;
mod form;
mod model;
mod resource;
mod schema;
mod weather;

#[tokio::main]
async fn main() {
    app::enable_tracing();
    let state = match app::initialize() {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("An error occurred during initialization. Details:\n{err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = app::run(state).await {
        tracing::error!("Server stopped unexpectedly. Details:\n{err}");
        std::process::exit(1);
    }
}
