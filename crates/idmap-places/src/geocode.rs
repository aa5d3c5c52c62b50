//! Turns a geocode response into a [`SearchArea`].

use idmap_core::SearchArea;

use crate::error::PlacesError;
use crate::types::FeatureCollection;

/// Resolves the first feature of a geocode response.
///
/// A point is preferred; the bounding box is used only when the feature has
/// no usable point.
///
/// # Errors
///
/// Returns [`PlacesError::NotFound`] when the response has no features, or
/// when the first feature carries neither a point nor a bounding box.
pub fn resolve_area(query: &str, response: &FeatureCollection) -> Result<SearchArea, PlacesError> {
    let not_found = || PlacesError::NotFound {
        query: query.to_string(),
    };
    let feature = response.features.first().ok_or_else(not_found)?;

    if let Some(point) = feature.geometry_point() {
        return Ok(SearchArea::Point(point));
    }
    if let Some(bbox) = feature.bounding_box() {
        tracing::debug!(query, ?bbox, "geocode match has no point; using bounding box");
        return Ok(SearchArea::Rect(bbox));
    }
    Err(not_found())
}
