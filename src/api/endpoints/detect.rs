//! Disease detection endpoint: multipart upload through the full pipeline.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, info};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::classify::AnalysisResult;
use crate::pipeline::preprocess;
use crate::pipeline::region::{self, RegionBox};
use crate::store;

#[derive(Serialize)]
pub struct DetectResponse {
    pub success: bool,
    pub result: DetectionView,
    pub analysis_id: String,
}

#[derive(Serialize)]
pub struct DetectionView {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionBox>,
}

/// `POST /api/detect-disease` — classify a crop-leaf photo.
///
/// Multipart fields: `image` (required, any decodable format) and
/// `location` (optional free text, recorded with the analysis).
pub async fn detect(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
    let mut image_bytes: Option<Vec<u8>> = None;
    let mut location = String::from("Unknown");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {e}")))?;
                image_bytes = Some(bytes.to_vec());
            }
            Some("location") => {
                if let Ok(text) = field.text().await {
                    if !text.trim().is_empty() {
                        location = text;
                    }
                }
            }
            _ => {}
        }
    }

    let bytes = image_bytes.ok_or_else(|| ApiError::BadRequest("No image provided".into()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("No image provided".into()));
    }

    let image = image::load_from_memory(&bytes)
        .map_err(|_| ApiError::BadRequest("Could not decode image".into()))?;

    let verdict = preprocess::validate(&image);
    if !verdict.ok {
        return Err(ApiError::ImageRejected(verdict.reason));
    }

    let enhanced = preprocess::enhance(&image);
    let (focused, region) = region::detect_plant_region(&enhanced);
    if let Some(ref r) = region {
        debug!(x = r.x, y = r.y, width = r.width, height = r.height, "Plant region isolated");
    }

    let tensor = preprocess::normalize(&focused);
    let analysis = ctx.classifier.classify(&tensor);
    info!(
        crop = %analysis.crop_type,
        disease = %analysis.disease,
        confidence = analysis.confidence,
        "Detection complete"
    );

    let record = store::AnalysisRecord::new(
        &analysis.crop_type,
        &analysis.disease,
        analysis.confidence as f64,
        analysis.severity.as_str(),
        &location,
    );
    {
        let conn = ctx.lock_db()?;
        store::insert_analysis(&conn, &record)?;
    }

    Ok(Json(DetectResponse {
        success: true,
        result: DetectionView { analysis, region },
        analysis_id: record.id.to_string(),
    }))
}
