mod proxy;
mod reviews;
mod search;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use idmap_places::{GeoapifyClient, PlacesError};
use idmap_store::{ReviewStore, StoreError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub client: GeoapifyClient,
    pub store: Arc<ReviewStore>,
    pub default_radius_km: f64,
    /// Deadline for each backend call made by a search run.
    pub attempt_timeout: Duration,
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
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_places_error(request_id: String, error: PlacesError) -> ApiError {
    match error {
        PlacesError::NotFound { query } => {
            ApiError::new(request_id, "not_found", format!("location not found: {query}"))
        }
        PlacesError::InvalidBaseUrl { .. } => {
            tracing::error!(error = %error, "geoapify client misconfigured");
            ApiError::new(request_id, "internal_error", "places backend misconfigured")
        }
        other => {
            tracing::warn!(error = %other, "places backend request failed");
            ApiError::new(request_id, "upstream_error", other.to_string())
        }
    }
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::Validation(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        StoreError::Io { .. } | StoreError::Json { .. } => {
            tracing::error!(error = %error, "review store failed");
            ApiError::new(request_id, "internal_error", "failed to save review")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/geocode", get(proxy::geocode))
        .route("/api/places", get(proxy::places))
        .route("/api/search", get(search::search))
        .route(
            "/api/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
