//! API index endpoint.

use axum::Json;
use serde_json::{json, Value};

use crate::config;

/// `GET /` — human-readable map of the API surface.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Crop Health & Agriculture Assistant API",
        "version": config::APP_VERSION,
        "endpoints": {
            "disease_detection": "/api/detect-disease",
            "market_prices": "/api/market-prices",
            "weather": "/api/weather",
            "remedies": "/api/remedies",
            "yield_tips": "/api/yield-tips",
            "crop_calendar": "/api/crop-calendar"
        }
    }))
}
