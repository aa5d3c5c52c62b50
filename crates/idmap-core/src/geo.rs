//! Location vocabulary shared by the search pipeline, the review store and
//! the HTTP layer.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components finite and inside the WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// What the geocoder resolved a location description to.
///
/// A point supports radius expansion; a box is searched exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchArea {
    Point(GeoPoint),
    Rect(BoundingBox),
}

/// A user's description of where to search. `country` is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuery {
    city: Option<String>,
    state: Option<String>,
    country: String,
}

impl LocationQuery {
    /// Builds a query from raw form input. Blank parts are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] when `country` is blank.
    pub fn new(
        city: Option<&str>,
        state: Option<&str>,
        country: &str,
    ) -> Result<Self, CoreError> {
        let country = country.trim();
        if country.is_empty() {
            return Err(CoreError::MissingField("country"));
        }
        Ok(Self {
            city: non_blank(city),
            state: non_blank(state),
            country: country.to_string(),
        })
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Free-text form sent to the geocoder, e.g. `"College Park, MD, USA"`.
    #[must_use]
    pub fn location_text(&self) -> String {
        [self.city.as_deref(), self.state.as_deref(), Some(self.country.as_str())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_text_joins_present_parts() {
        let q = LocationQuery::new(Some("College Park"), Some("MD"), "USA").unwrap();
        assert_eq!(q.location_text(), "College Park, MD, USA");
    }

    #[test]
    fn location_text_skips_blank_parts() {
        let q = LocationQuery::new(Some("  "), None, " France ").unwrap();
        assert_eq!(q.location_text(), "France");
        assert!(q.city().is_none());
    }

    #[test]
    fn blank_country_is_rejected() {
        let err = LocationQuery::new(Some("College Park"), Some("MD"), "  ").unwrap_err();
        assert_eq!(err, CoreError::MissingField("country"));
        assert_eq!(err.to_string(), "country is required");
    }

    #[test]
    fn geo_point_accepts_lng_alias() {
        let p: GeoPoint = serde_json::from_str(r#"{"lat": 38.99, "lng": -76.94}"#).unwrap();
        assert_eq!(p, GeoPoint::new(38.99, -76.94));
        assert!(p.is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
    }

    #[test]
    fn search_area_serializes_with_kind_tag() {
        let area = SearchArea::Point(GeoPoint::new(1.0, 2.0));
        let json = serde_json::to_value(area).unwrap();
        assert_eq!(json["kind"], "point");
        assert_eq!(json["lat"], 1.0);
    }
}
