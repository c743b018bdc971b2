use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use basinq_core::enrich_values;
use basinq_vision::{PlanImage, VisionError};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_json_rejection, ApiError, ApiResponse, AppState, ReportData, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    /// Base64 image bytes, or a complete `data:` URL.
    pub base64: Option<String>,
    pub media_type: Option<String>,
}

/// Extract structure rows from an uploaded plan image and price them.
pub(super) async fn analyze_plan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ReportData>>, ApiError> {
    let Json(body) = body.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;

    if let Some(media_type) = body.media_type.as_deref() {
        if !media_type.trim().starts_with("image/") {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                format!("media_type must be an image type, got '{media_type}'"),
            ));
        }
    }

    let image = body
        .base64
        .filter(|b| !b.trim().is_empty())
        .map(|b| PlanImage::new(b, body.media_type.as_deref()));

    let records = state
        .extractor
        .extract(image.as_ref())
        .await
        .map_err(|e| map_vision_error(req_id.0.clone(), &e))?;

    let report = enrich_values(&state.catalog, state.options, records);

    Ok(Json(ApiResponse {
        data: ReportData::from(report),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_vision_error(request_id: String, error: &VisionError) -> ApiError {
    match error {
        VisionError::MissingImage => {
            ApiError::new(request_id, "validation_error", "missing base64 image data")
        }
        other => {
            tracing::error!(error = %other, "structure extraction failed");
            ApiError::new(request_id, "upstream_error", other.to_string())
        }
    }
}
