//! Review endpoints. Bodies are the bare review JSON map clients read;
//! only errors use the [`ApiError`] envelope.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use idmap_core::{NewReview, Review, ReviewFilter};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, AppState};

pub(super) async fn list_reviews(
    State(state): State<AppState>,
    Query(filter): Query<ReviewFilter>,
) -> Json<Vec<Review>> {
    Json(state.store.list_filtered(&filter).await)
}

pub(super) async fn create_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let Json(new) =
        payload.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let review = state
        .store
        .append(new)
        .await
        .map_err(|e| map_store_error(req_id.0, &e))?;

    Ok((StatusCode::CREATED, Json(review)))
}
