use axum::{extract::State, Extension, Json};
use basinq_core::Catalog;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_catalog(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Catalog>> {
    Json(ApiResponse {
        data: Catalog::clone(&state.catalog),
        meta: ResponseMeta::new(req_id.0),
    })
}
