//! Remedy lookup endpoint.

use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::lookup;

#[derive(Deserialize)]
pub struct RemediesQuery {
    #[serde(default)]
    pub disease: String,
    #[serde(default)]
    pub crop: String,
}

/// `GET /api/remedies?disease=...&crop=...` — remedies for a detected
/// disease. A miss still answers 200 with generic fallback advice.
pub async fn remedies(Query(query): Query<RemediesQuery>) -> Json<Value> {
    let body = match lookup::lookup_remedies(&query.disease, &query.crop) {
        Ok(set) => json!({ "success": true, "remedies": set }),
        Err(miss) => {
            debug!(disease = %query.disease, crop = %query.crop, code = miss.code(), "Remedy lookup miss");
            json!({ "success": true, "remedies": miss.payload() })
        }
    };
    Json(body)
}
