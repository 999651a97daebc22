//! Weather forecast and farming-advice endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::types::ApiContext;
use crate::gateway::weather::{self, FarmingAdvice, WeatherSnapshot, DEFAULT_FORECAST_DAYS};

fn default_location() -> String {
    "Mumbai".to_string()
}

#[derive(Deserialize)]
pub struct WeatherQuery {
    #[serde(default = "default_location")]
    pub location: String,
    pub days: Option<usize>,
}

#[derive(Serialize)]
pub struct WeatherResponse {
    pub success: bool,
    pub weather: WeatherSnapshot,
    pub location: String,
}

/// `GET /api/weather?location=...&days=...` — forecast for farming decisions.
pub async fn forecast(
    State(ctx): State<ApiContext>,
    Query(query): Query<WeatherQuery>,
) -> Json<WeatherResponse> {
    let days = query.days.unwrap_or(DEFAULT_FORECAST_DAYS).clamp(1, 7);
    let snapshot = ctx.weather.forecast(&query.location, days).await;

    Json(WeatherResponse {
        success: true,
        weather: snapshot,
        location: query.location,
    })
}

#[derive(Serialize)]
pub struct AdviceResponse {
    pub success: bool,
    pub advice: FarmingAdvice,
}

/// `GET /api/weather/advice?location=...` — recommendations derived from
/// current conditions.
pub async fn advice(
    State(ctx): State<ApiContext>,
    Query(query): Query<WeatherQuery>,
) -> Json<AdviceResponse> {
    let advice = ctx.weather.farming_advice(&query.location).await;
    Json(AdviceResponse {
        success: true,
        advice,
    })
}

#[derive(Serialize)]
pub struct LocationsResponse {
    pub success: bool,
    pub locations: Vec<&'static str>,
}

/// `GET /api/weather/locations` — locations covered by the demo dataset.
pub async fn locations() -> Json<LocationsResponse> {
    Json(LocationsResponse {
        success: true,
        locations: weather::supported_locations(),
    })
}
