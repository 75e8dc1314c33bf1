use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use voyage_agents::{ExtractionError, Extractor, ExtractorConfig};
use voyage_core::{ExtractRequest, Itinerary};
use voyage_observability::AppMetrics;

const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub extractor: Arc<Extractor>,
    pub metrics: Arc<AppMetrics>,
    pub max_repairs: u32,
}

impl ApiState {
    pub fn new(extractor: Extractor, max_repairs: u32) -> Self {
        let metrics = extractor.metrics().clone();
        Self {
            extractor: Arc::new(extractor),
            metrics,
            max_repairs,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug)]
enum ApiError {
    InvalidRequest(String),
    BadUpstream(String),
    Unexpected(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::InvalidRequest(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            Self::BadUpstream(detail) => (StatusCode::BAD_GATEWAY, detail),
            Self::Unexpected(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unexpected error: {detail}"),
            ),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        if err.is_upstream() {
            Self::BadUpstream(err.to_string())
        } else {
            Self::Unexpected(err.to_string())
        }
    }
}

/// Builds the router from configuration. A live configuration without an API
/// key is rejected here so the process never starts half-configured.
pub fn build_app(config: &ExtractorConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let extractor = Extractor::from_config(config, metrics)
        .context("failed to initialize itinerary extractor")?;

    Ok(build_router(ApiState::new(extractor, config.max_repairs)))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/favicon.ico", get(favicon))
        .route("/metrics", get(metrics))
        .route("/extract-itinerary", post(extract_itinerary))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(HealthResponse { ok: true })
}

// Browsers ask for it on every visit.
async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

async fn extract_itinerary(
    State(state): State<ApiState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<Itinerary>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected extraction request body");
        ApiError::InvalidRequest(rejection.body_text())
    })?;
    request
        .validate()
        .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;

    let outcome = state
        .extractor
        .extract(
            &request.text,
            request.max_days,
            &request.currency,
            state.max_repairs,
        )
        .await
        .map_err(|err| {
            if !err.is_upstream() {
                error!(error = %err, "unexpected extraction failure");
            }
            ApiError::from(err)
        })?;

    Ok(Json(outcome.itinerary))
}
