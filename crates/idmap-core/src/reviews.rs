//! Accessibility-challenge reviews attached to a place.
//!
//! Challenge ratings are opaque: any name, any integer (or `null` for "not
//! rated"). Nothing here interprets them. Fields a client sends beyond the
//! ones named below are carried in `extra` and written back unchanged.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{CoreError, GeoPoint};

/// Keys owned by the stored record; a submitted body may not shadow them.
const RESERVED_KEYS: [&str; 2] = ["id", "timestamp"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewLocation {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub address: String,
}

/// A review as submitted, before the store assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[serde(serialize_with = "serialize_lat_lng")]
    pub coords: GeoPoint,
    #[serde(default = "unknown_place")]
    pub place_name: String,
    #[serde(default)]
    pub location: ReviewLocation,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub challenges: BTreeMap<String, Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn unknown_place() -> String {
    "Unknown".to_string()
}

/// Map clients read review coordinates as `{lat, lng}`.
fn serialize_lat_lng<S: Serializer>(point: &GeoPoint, serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct LatLng {
        lat: f64,
        lng: f64,
    }

    LatLng {
        lat: point.lat,
        lng: point.lon,
    }
    .serialize(serializer)
}

impl NewReview {
    /// # Errors
    ///
    /// - [`CoreError::MissingField`] when `location.country` is blank.
    /// - [`CoreError::InvalidCoordinates`] when `coords` is outside WGS84.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.location.country.trim().is_empty() {
            return Err(CoreError::MissingField("country"));
        }
        if !self.coords.is_valid() {
            return Err(CoreError::InvalidCoordinates {
                lat: self.coords.lat,
                lon: self.coords.lon,
            });
        }
        Ok(())
    }
}

/// Identifier of a stored review.
///
/// New reviews get a UUID string; stores written by the earlier service hold
/// millisecond timestamps as integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewId {
    Number(u64),
    Text(String),
}

impl ReviewId {
    #[must_use]
    pub fn generate() -> Self {
        ReviewId::Text(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewId::Number(n) => write!(f, "{n}"),
            ReviewId::Text(s) => f.write_str(s),
        }
    }
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub body: NewReview,
}

impl Review {
    #[must_use]
    pub fn from_new(mut body: NewReview, timestamp: DateTime<Utc>) -> Self {
        for key in RESERVED_KEYS {
            body.extra.remove(key);
        }
        Self {
            id: ReviewId::generate(),
            timestamp,
            body,
        }
    }
}

/// Past-review filter. Every present, non-blank term must match as a
/// case-insensitive substring; `category` matches the place name or the
/// review's category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewFilter {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
}

impl ReviewFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.city, &self.state, &self.country, &self.category]
            .into_iter()
            .all(|term| term_of(term.as_deref()).is_none())
    }

    #[must_use]
    pub fn matches(&self, review: &Review) -> bool {
        let body = &review.body;
        let location = &body.location;
        let field_ok = |term: Option<&str>, field: &str| {
            term_of(term).is_none_or(|t| contains_ci(field, &t))
        };

        field_ok(self.city.as_deref(), &location.city)
            && field_ok(self.state.as_deref(), &location.state)
            && field_ok(self.country.as_deref(), &location.country)
            && term_of(self.category.as_deref()).is_none_or(|t| {
                contains_ci(&body.place_name, &t)
                    || body.category.as_deref().is_some_and(|c| contains_ci(c, &t))
            })
    }
}

/// Lowercased, trimmed term; `None` when absent or blank.
fn term_of(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewReview {
        serde_json::from_value(serde_json::json!({
            "coords": { "lat": 38.99, "lng": -76.94 },
            "placeName": "Board and Brew",
            "location": { "city": "College Park", "state": "MD", "country": "USA" },
            "comments": "Loud at lunch.",
            "challenges": { "noise": 4, "lighting": null },
            "created": "2024-05-01T12:00:00.000Z"
        }))
        .expect("valid review json")
    }

    fn stored(place: &str, city: &str, category: Option<&str>) -> Review {
        let mut body = sample();
        body.place_name = place.to_string();
        body.location.city = city.to_string();
        body.category = category.map(str::to_string);
        Review::from_new(body, Utc::now())
    }

    #[test]
    fn deserializes_submitted_payload() {
        let review = sample();
        assert_eq!(review.place_name, "Board and Brew");
        assert_eq!(review.challenges.get("noise"), Some(&Some(4)));
        assert_eq!(review.challenges.get("lighting"), Some(&None));
        assert_eq!(review.extra["created"], "2024-05-01T12:00:00.000Z");
        assert!(review.validate().is_ok());
    }

    #[test]
    fn missing_place_name_defaults_to_unknown() {
        let review: NewReview = serde_json::from_value(serde_json::json!({
            "coords": { "lat": 1.0, "lon": 2.0 },
            "location": { "country": "USA" }
        }))
        .unwrap();
        assert_eq!(review.place_name, "Unknown");
        assert!(review.extra.is_empty());
    }

    #[test]
    fn validate_requires_country() {
        let mut review = sample();
        review.location.country = String::new();
        assert_eq!(review.validate(), Err(CoreError::MissingField("country")));
    }

    #[test]
    fn stored_review_flattens_body_and_keeps_unknown_fields() {
        let stored = Review::from_new(sample(), Utc::now());
        let json = serde_json::to_value(&stored).unwrap();
        assert!(json["id"].is_string());
        assert_eq!(json["placeName"], "Board and Brew");
        assert_eq!(json["created"], "2024-05-01T12:00:00.000Z");
        assert_eq!(json["coords"], serde_json::json!({ "lat": 38.99, "lng": -76.94 }));
        let back: Review = serde_json::from_value(json).unwrap();
        assert_eq!(back, stored);
    }

    #[test]
    fn submitted_id_and_timestamp_are_not_kept() {
        let mut body = sample();
        body.extra.insert("id".to_string(), serde_json::json!(42));
        body.extra.insert("timestamp".to_string(), serde_json::json!("yesterday"));

        let stored = Review::from_new(body, Utc::now());
        assert!(matches!(stored.id, ReviewId::Text(_)));
        let json = serde_json::to_string(&stored).unwrap();
        let back: Review = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stored);
    }

    #[test]
    fn legacy_review_with_numeric_id_loads() {
        let review: Review = serde_json::from_value(serde_json::json!({
            "id": 1_700_000_000_000_u64,
            "timestamp": "2023-11-14T22:13:20.000Z",
            "coords": { "lat": 38.99, "lng": -76.94 },
            "placeName": "Board and Brew",
            "location": { "city": "College Park", "state": "MD", "country": "USA" },
            "noise": 3
        }))
        .unwrap();
        assert_eq!(review.id, ReviewId::Number(1_700_000_000_000));
        assert_eq!(review.id.to_string(), "1700000000000");
        assert_eq!(review.body.extra["noise"], 3);

        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["id"], 1_700_000_000_000_u64);
        assert_eq!(json["noise"], 3);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ReviewFilter {
            city: Some("   ".to_string()),
            ..ReviewFilter::default()
        };
        assert!(filter.is_empty());
        assert!(filter.matches(&stored("Giant Food", "", None)));
    }

    #[test]
    fn location_terms_are_case_insensitive_substrings() {
        let review = stored("Giant Food", "College Park", None);
        let filter = ReviewFilter {
            city: Some(" college ".to_string()),
            state: Some("md".to_string()),
            country: Some("us".to_string()),
            category: None,
        };
        assert!(filter.matches(&review));

        let filter = ReviewFilter {
            city: Some("Hyattsville".to_string()),
            ..ReviewFilter::default()
        };
        assert!(!filter.matches(&review));
        assert!(!filter.matches(&stored("Giant Food", "", None)));
    }

    #[test]
    fn category_term_matches_place_name_or_category() {
        let filter = ReviewFilter {
            category: Some("supermarket".to_string()),
            ..ReviewFilter::default()
        };
        assert!(filter.matches(&stored("Giant Food", "College Park", Some("commercial.supermarket"))));
        assert!(filter.matches(&stored("Supermarket Express", "College Park", None)));
        assert!(!filter.matches(&stored("Giant Food", "College Park", None)));
    }
}
