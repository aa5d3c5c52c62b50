use axum::{
    extract::{Query, State},
    Extension, Json,
};
use idmap_places::{
    present, DisplayItem, FailureReason, PlaceSearch, Presentation, SearchForm, SearchOutcome,
    SearchRequest,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    /// `"results"` or `"empty"`; failed runs are reported as errors.
    outcome: &'static str,
    items: Vec<DisplayItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Radii planned for the run, in meters.
    radii: Vec<u32>,
    attempts: usize,
}

/// Runs one progressive search. Each request gets its own run tracker, so
/// concurrent callers never supersede each other.
pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(form): Query<SearchForm>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let request = SearchRequest::from_form(&form)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let report = PlaceSearch::new(state.client.clone())
        .with_attempt_timeout(state.attempt_timeout)
        .with_default_radius_km(state.default_radius_km)
        .run(&request, None)
        .await
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "internal_error", "search was cancelled"))?;

    let (outcome, items, message) = match present(&report.outcome) {
        Presentation::Items(items) => ("results", items, None),
        Presentation::EmptyState(message) => ("empty", Vec::new(), Some(message)),
        Presentation::Error(message) => {
            let code = match report.outcome {
                SearchOutcome::Failed(FailureReason::NotFound { .. }) => "not_found",
                _ => "upstream_error",
            };
            return Err(ApiError::new(req_id.0, code, message));
        }
    };

    Ok(Json(ApiResponse {
        data: SearchData {
            outcome,
            items,
            message,
            radii: report.radii,
            attempts: report.attempts,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
