use crate::api::extract::Form;
use crate::api;
use crate::app::AppState;
use crate::auth::Client;
use crate::flash::{self, Category};
use crate::form::{FormErrors, FormView};
use crate::weather::{self, WeatherError, WeatherReport};
use axum::extract::{Extension, State};
use axum::response::Response;
use axum::{Router, routing};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub fn routes() -> Router<AppState> {
    Router::new().route("/weather", routing::get(weather_page).post(lookup))
}

#[derive(Default, Deserialize, Serialize, Validate)]
#[serde(default)]
struct WeatherForm {
    #[validate(custom(function = "crate::form::required"))]
    city: String,
}

#[derive(Serialize)]
struct WeatherPage {
    #[serde(flatten)]
    form: FormView<WeatherForm>,
    weather_data: Option<WeatherReport>,
}

async fn weather_page(Extension(client): Extension<Client>, jar: CookieJar) -> Response {
    let page = WeatherPage {
        form: FormView::fresh(WeatherForm::default()),
        weather_data: None,
    };
    api::render(jar, client, Some(String::from("Weather")), page)
}

/// Looks up the current forecast for a city. Upstream failures are reported as a flash
/// message on the same page rather than as an error response.
async fn lookup(
    State(state): State<AppState>,
    Extension(client): Extension<Client>,
    mut jar: CookieJar,
    Form(form): Form<WeatherForm>,
) -> Response {
    let errors = FormErrors::validate(&form);
    let mut weather_data = None;
    if errors.is_empty() {
        match weather::lookup(&state.http_client, &state.config.weather, form.city.trim()).await {
            Ok(report) => weather_data = Some(report),
            Err(err) => {
                log_lookup_error(err);
                jar = flash::push(jar, Category::Danger, "City not found or API error!");
            }
        }
    }

    let page = WeatherPage {
        form: FormView::new(form, errors),
        weather_data,
    };
    api::render(jar, client, Some(String::from("Weather")), page)
}

fn log_lookup_error(err: WeatherError) {
    match err {
        // Request URLs carry the API key
        WeatherError::Request(err) => tracing::warn!("Weather lookup failed: {}", err.without_url()),
        err => tracing::warn!("Weather lookup failed: {err}"),
    }
}
