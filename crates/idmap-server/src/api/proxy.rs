//! Pass-through endpoints for map clients that talk GeoJSON directly. The
//! backend body is returned unchanged; only failures use the API envelope.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_places_error, ApiError, AppState};

/// Geoapify caps a single places page at 500.
const MAX_LIMIT: u32 = 500;

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeQuery {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlacesQuery {
    pub filter: Option<String>,
    /// `west,south,east,north`; shorthand for `filter=rect:...`.
    pub bbox: Option<String>,
    pub categories: Option<String>,
    pub name: Option<String>,
    pub limit: Option<u32>,
}

pub(super) fn normalize_limit(limit: Option<u32>) -> Option<u32> {
    limit.map(|l| l.clamp(1, MAX_LIMIT))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(super) async fn geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(text) = non_blank(params.query.as_deref()) else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "query parameter required",
        ));
    };

    let body = state
        .client
        .geocode_raw(text)
        .await
        .map_err(|e| map_places_error(req_id.0.clone(), e))?;
    Ok(Json(body))
}

pub(super) async fn places(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<PlacesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = match (
        non_blank(params.filter.as_deref()),
        non_blank(params.bbox.as_deref()),
    ) {
        (Some(filter), _) => filter.to_string(),
        (None, Some(bbox)) => format!("rect:{bbox}"),
        (None, None) => {
            return Err(ApiError::new(
                req_id.0,
                "bad_request",
                "filter parameter required",
            ))
        }
    };

    let body = state
        .client
        .places_raw(
            &filter,
            non_blank(params.categories.as_deref()),
            non_blank(params.name.as_deref()),
            normalize_limit(params.limit),
        )
        .await
        .map_err(|e| map_places_error(req_id.0.clone(), e))?;
    Ok(Json(body))
}
