//! Yield improvement tips endpoint.

use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::lookup;

fn default_crop() -> String {
    "tomato".to_string()
}

#[derive(Deserialize)]
pub struct YieldQuery {
    #[serde(default = "default_crop")]
    pub crop: String,
}

/// `GET /api/yield-tips?crop=...` — cultivation tips; misses answer 200
/// with generic advice.
pub async fn tips(Query(query): Query<YieldQuery>) -> Json<Value> {
    let body = match lookup::lookup_yield_tips(&query.crop) {
        Ok(set) => json!({ "success": true, "tips": set }),
        Err(miss) => json!({ "success": true, "tips": miss.payload() }),
    };
    Json(body)
}
