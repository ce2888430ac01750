use crate::config::WeatherConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
#[error(transparent)]
pub enum WeatherError {
    #[error("Weather base URL cannot be extended with a city")]
    InvalidBaseUrl,
    #[error("Forecast has no days")]
    MissingDays,
    Request(#[from] reqwest::Error),
}

/// First forecast day for a city, as shown on the weather page.
#[derive(Debug, PartialEq, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: f64,
    pub description: String,
}

/// Fetches the forecast for `city`. Each call issues a fresh request with no retries or timeout.
pub async fn lookup(client: &reqwest::Client, config: &WeatherConfig, city: &str) -> Result<WeatherReport, WeatherError> {
    let url = timeline_url(config, city)?;
    let timeline: Timeline = client.get(url).send().await?.json().await?;
    let today = timeline
        .days
        .and_then(|days| days.into_iter().next())
        .ok_or(WeatherError::MissingDays)?;

    Ok(WeatherReport {
        city: city.to_owned(),
        temperature: today.temp,
        description: today.description,
    })
}

#[derive(Deserialize)]
struct Timeline {
    days: Option<Vec<Day>>,
}

#[derive(Deserialize)]
struct Day {
    temp: f64,
    description: String,
}

/// Appends `city` as a path segment so it is percent-encoded, then adds the query parameters.
fn timeline_url(config: &WeatherConfig, city: &str) -> Result<Url, WeatherError> {
    let mut url = config.base_url.clone();
    url.path_segments_mut()
        .map_err(|()| WeatherError::InvalidBaseUrl)?
        .pop_if_empty()
        .push(city);
    url.query_pairs_mut()
        .append_pair("unitGroup", "metric")
        .append_pair("key", &config.api_key)
        .append_pair("contentType", "json");
    Ok(url)
}
