//! Analysis history endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::store::{self, AnalysisRecord};

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub analyses: Vec<AnalysisRecord>,
    pub count: usize,
}

/// `GET /api/analyses?limit=...` — recent detection runs, newest first.
pub async fn recent(
    State(ctx): State<ApiContext>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query.limit.unwrap_or(20).min(100);
    let conn = ctx.lock_db()?;
    let analyses = store::recent_analyses(&conn, limit)?;
    let count = analyses.len();

    Ok(Json(HistoryResponse {
        success: true,
        analyses,
        count,
    }))
}
