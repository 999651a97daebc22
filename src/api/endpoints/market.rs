//! Mandi price endpoints.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::gateway::market::{self, PriceReport, PriceTrends};
use crate::store;

fn default_crop() -> String {
    "tomato".to_string()
}

fn default_market() -> String {
    "all".to_string()
}

#[derive(Deserialize)]
pub struct PricesQuery {
    #[serde(default = "default_crop")]
    pub crop: String,
    #[serde(default = "default_market")]
    pub market: String,
}

#[derive(Serialize)]
pub struct PricesResponse {
    pub success: bool,
    pub prices: PriceReport,
    pub timestamp: String,
}

/// `GET /api/market-prices?crop=...&market=...` — current quotes, demo data
/// when the provider is unreachable. Each served quote is also captured in
/// the snapshot log.
pub async fn prices(
    State(ctx): State<ApiContext>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<PricesResponse>, ApiError> {
    let report = ctx.market.prices(&query.crop, &query.market).await;

    {
        let conn = ctx.lock_db()?;
        for quote in &report.prices {
            let snap = store::PriceSnapshot::new(
                &report.crop,
                &quote.market,
                quote.price,
                &quote.unit,
                &quote.date,
            );
            if let Err(e) = store::insert_price_snapshot(&conn, &snap) {
                // The quote still goes out; only the log entry is lost.
                warn!(error = %e, "Failed to record price snapshot");
            }
        }
    }

    Ok(Json(PricesResponse {
        success: true,
        prices: report,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

fn default_days() -> usize {
    7
}

#[derive(Deserialize)]
pub struct TrendsQuery {
    #[serde(default = "default_crop")]
    pub crop: String,
    #[serde(default = "default_days")]
    pub days: usize,
}

#[derive(Serialize)]
pub struct TrendsResponse {
    pub success: bool,
    pub trends: PriceTrends,
}

/// `GET /api/market-prices/trends?crop=...&days=...` — synthetic recent
/// price history around the demo base price.
pub async fn trends(
    State(ctx): State<ApiContext>,
    Query(query): Query<TrendsQuery>,
) -> Json<TrendsResponse> {
    let days = query.days.clamp(1, 30);
    Json(TrendsResponse {
        success: true,
        trends: ctx.market.price_trends(&query.crop, days),
    })
}

#[derive(Serialize)]
pub struct MarketsResponse {
    pub success: bool,
    pub crops: Vec<&'static str>,
    pub markets: Vec<&'static str>,
}

/// `GET /api/market-prices/markets` — crops and mandis in the demo dataset.
pub async fn markets() -> Json<MarketsResponse> {
    Json(MarketsResponse {
        success: true,
        crops: market::supported_crops(),
        markets: market::supported_markets(),
    })
}
