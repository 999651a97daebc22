//! Crop calendar endpoint.

use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::lookup;

fn default_crop() -> String {
    "tomato".to_string()
}

fn default_location() -> String {
    "India".to_string()
}

#[derive(Deserialize)]
pub struct CalendarQuery {
    #[serde(default = "default_crop")]
    pub crop: String,
    #[serde(default = "default_location")]
    pub location: String,
}

/// `GET /api/crop-calendar?crop=...&location=...` — sowing and harvest
/// windows; unknown locations fall back to the all-India entry.
pub async fn calendar(Query(query): Query<CalendarQuery>) -> Json<Value> {
    let body = match lookup::lookup_calendar(&query.crop, &query.location) {
        Ok(cal) => json!({ "success": true, "calendar": cal }),
        Err(miss) => json!({ "success": true, "calendar": miss.payload() }),
    };
    Json(body)
}
