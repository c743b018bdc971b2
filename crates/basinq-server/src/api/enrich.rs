use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use basinq_core::enrich_values;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_json_rejection, ApiError, ApiResponse, AppState, ReportData, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct EnrichRequest {
    pub structures: Vec<serde_json::Value>,
}

/// Price structure rows supplied directly by the caller.
pub(super) async fn enrich_structures(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<EnrichRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ReportData>>, ApiError> {
    let Json(body) = body.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;

    let report = enrich_values(&state.catalog, state.options, body.structures);

    Ok(Json(ApiResponse {
        data: ReportData::from(report),
        meta: ResponseMeta::new(req_id.0),
    }))
}
