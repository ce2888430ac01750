use ::config::{ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Server configuration. Values are layered, with later sources taking precedence:
/// built-in defaults from `config.toml.dist`, an optional `config.toml`, then
/// environment variables prefixed with `BULLETIN_`.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub password_secret: String,
    pub weather: WeatherConfig,
}

#[derive(Debug, Deserialize)]
pub struct WeatherConfig {
    /// Timeline endpoint. The city is appended as the final path segment.
    pub base_url: Url,
    pub api_key: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is not an error.
        dotenvy::dotenv().ok();

        ::config::Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(get_config_path()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
pub fn test_config(weather_base_url: Option<Url>) -> Config {
    let base_url = weather_base_url
        .unwrap_or_else(|| Url::parse("http://localhost/timeline").expect("Test URL should be valid"));
    Config {
        port: 0,
        database_url: String::from(":memory:"),
        password_secret: String::from("test_secret"),
        weather: WeatherConfig {
            base_url,
            api_key: String::from("test_key"),
        },
    }
}

const DEFAULT_CONFIG: &str = include_str!("../config.toml.dist");
const ENV_PREFIX: &str = "BULLETIN";

fn get_config_path() -> PathBuf {
    // Use config.toml in the crate directory if in development environment, next to the executable in production
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(var) => {
            let mut project_path = PathBuf::from(var);
            project_path.push("config.toml");
            project_path
        }
        Err(_) => {
            let mut parent_path = std::env::current_exe()
                .ok()
                .and_then(|exe_path| exe_path.parent().map(PathBuf::from))
                .unwrap_or_default();
            parent_path.push("config.toml");
            parent_path
        }
    }
}
