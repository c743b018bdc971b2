mod analyze;
mod catalog;
mod enrich;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use basinq_core::{
    Catalog, EnrichOptions, EnrichmentReport, EnrichedStructure, ExcludedStructure,
    ExtractionMode, FailureReason, StructureFailure,
};
use basinq_vision::StructureExtractor;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::middleware::{
    enforce_rate_limit, payload_too_large_envelope, request_id, require_bearer_auth, AuthState,
    RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub extractor: Arc<dyn StructureExtractor>,
    pub options: EnrichOptions,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    extraction_mode: ExtractionMode,
    catalog_family: String,
    diameters: Vec<u32>,
}

/// Enrichment outcome as returned by `/analyze` and `/enrich`.
#[derive(Debug, Serialize)]
pub(super) struct ReportData {
    structures: Vec<EnrichedStructure>,
    failures: Vec<FailureItem>,
    excluded: Vec<ExcludedStructure>,
    #[serde(with = "rust_decimal::serde::float")]
    total_price: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct FailureItem {
    index: usize,
    id: Option<String>,
    #[serde(flatten)]
    reason: FailureReason,
    message: String,
}

impl From<StructureFailure> for FailureItem {
    fn from(failure: StructureFailure) -> Self {
        Self {
            index: failure.index,
            id: failure.id,
            message: failure.reason.to_string(),
            reason: failure.reason,
        }
    }
}

impl From<EnrichmentReport> for ReportData {
    fn from(report: EnrichmentReport) -> Self {
        let total_price = report.total_price();
        Self {
            structures: report.structures,
            failures: report.failures.into_iter().map(FailureItem::from).collect(),
            excluded: report.excluded,
            total_price,
        }
    }
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Map a JSON body rejection into the standard error envelope.
pub(super) fn map_json_rejection(request_id: String, rejection: &JsonRejection) -> ApiError {
    let code = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "validation_error"
    };
    ApiError::new(request_id, code, rejection.body_text())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/analyze", post(analyze::analyze_plan))
        .route("/api/v1/enrich", post(enrich::enrich_structures))
        .route("/api/v1/catalog", get(catalog::get_catalog))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(
    state: AppState,
    auth: AuthState,
    rate_limit: RateLimitState,
    max_body_bytes: usize,
) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(axum::middleware::from_fn_with_state(
                    max_body_bytes,
                    payload_too_large_envelope,
                ))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            extraction_mode: state.extractor.mode(),
            catalog_family: state.catalog.family.clone(),
            diameters: state.catalog.diameters(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(60, Duration::from_secs(60))
}
