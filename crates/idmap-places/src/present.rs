//! Turns a [`SearchOutcome`] into display-ready rows or a user-facing
//! message.
//!
//! Results are shown in the order the backend returned them. Duplicates are
//! not collapsed.

use idmap_core::GeoPoint;
use serde::Serialize;

use crate::search::{FailureReason, MatchStage, PoiResult, SearchOutcome};
use crate::types::Place;

pub const EMPTY_MESSAGE: &str = "No places found.";
pub const NOT_FOUND_MESSAGE: &str = "Location not found — try a different city/state/country.";

const UNNAMED: &str = "Unnamed place";
const UNKNOWN_CATEGORY: &str = "Unknown category";

/// One row of a result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayItem {
    pub title: String,
    pub subtitle: String,
    pub category: String,
    pub coords: GeoPoint,
    pub stage: MatchStage,
    /// Short provenance label, e.g. `"category fallback"`.
    pub stage_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Presentation {
    Items(Vec<DisplayItem>),
    EmptyState(String),
    Error(String),
}

#[must_use]
pub fn present(outcome: &SearchOutcome) -> Presentation {
    match outcome {
        SearchOutcome::Results(results) => {
            Presentation::Items(results.iter().map(display_item).collect())
        }
        SearchOutcome::Empty => Presentation::EmptyState(EMPTY_MESSAGE.to_string()),
        SearchOutcome::Failed(FailureReason::NotFound { .. }) => {
            Presentation::Error(NOT_FOUND_MESSAGE.to_string())
        }
        SearchOutcome::Failed(FailureReason::Upstream { message, .. }) => {
            Presentation::Error(message.clone())
        }
    }
}

/// `formatted` when present, else the non-empty address lines joined by
/// `", "`.
#[must_use]
pub fn format_address(place: &Place) -> String {
    if let Some(formatted) = place.formatted.as_deref().filter(|f| !f.trim().is_empty()) {
        return formatted.to_string();
    }
    [place.address_line1.as_deref(), place.address_line2.as_deref()]
        .into_iter()
        .flatten()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_item(result: &PoiResult) -> DisplayItem {
    let place = &result.place;
    let mut subtitle = format_address(place);
    if let Some(city) = place.city.as_deref().filter(|c| !c.trim().is_empty()) {
        if !subtitle.is_empty() {
            subtitle.push_str(" · ");
        }
        subtitle.push_str(city);
    }

    DisplayItem {
        title: place.name.clone().unwrap_or_else(|| UNNAMED.to_string()),
        subtitle,
        category: place
            .category
            .clone()
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        coords: place.coords,
        stage: result.stage.clone(),
        stage_label: result.stage.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place() -> Place {
        Place {
            name: Some("Giant Food".to_string()),
            coords: GeoPoint::new(38.98, -76.93),
            category: Some("commercial.supermarket".to_string()),
            formatted: None,
            address_line1: Some("Giant Food".to_string()),
            address_line2: Some("7546 Annapolis Rd, Hyattsville, MD".to_string()),
            city: Some("Hyattsville".to_string()),
            state: Some("Maryland".to_string()),
            country: Some("United States".to_string()),
        }
    }

    #[test]
    fn address_prefers_formatted() {
        let mut p = place();
        p.formatted = Some("Giant Food, 7546 Annapolis Rd".to_string());
        assert_eq!(format_address(&p), "Giant Food, 7546 Annapolis Rd");
    }

    #[test]
    fn address_joins_non_empty_lines() {
        let mut p = place();
        p.address_line1 = Some("  ".to_string());
        assert_eq!(format_address(&p), "7546 Annapolis Rd, Hyattsville, MD");
        p.address_line2 = None;
        assert_eq!(format_address(&p), "");
    }

    #[test]
    fn items_carry_defaults_and_provenance() {
        let mut unnamed = place();
        unnamed.name = None;
        unnamed.category = None;
        unnamed.city = None;
        let outcome = SearchOutcome::Results(vec![
            PoiResult {
                place: place(),
                stage: MatchStage::Direct,
            },
            PoiResult {
                place: unnamed,
                stage: MatchStage::NameOnly,
            },
        ]);

        let Presentation::Items(items) = present(&outcome) else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Giant Food");
        assert_eq!(
            items[0].subtitle,
            "Giant Food, 7546 Annapolis Rd, Hyattsville, MD · Hyattsville"
        );
        assert_eq!(items[0].stage_label, "direct");
        assert_eq!(items[1].title, "Unnamed place");
        assert_eq!(items[1].category, "Unknown category");
        assert!(!items[1].subtitle.contains('·'));
        assert_eq!(items[1].stage_label, "name only");
    }

    #[test]
    fn city_alone_when_there_is_no_address() {
        let mut p = place();
        p.address_line1 = None;
        p.address_line2 = None;
        p.city = Some("College Park".to_string());
        let outcome = SearchOutcome::Results(vec![PoiResult {
            place: p,
            stage: MatchStage::Direct,
        }]);

        let Presentation::Items(items) = present(&outcome) else {
            panic!("expected items");
        };
        assert_eq!(items[0].subtitle, "College Park");
    }

    #[test]
    fn empty_and_failures_become_messages() {
        assert_eq!(
            present(&SearchOutcome::Empty),
            Presentation::EmptyState("No places found.".to_string())
        );
        assert_eq!(
            present(&SearchOutcome::Failed(FailureReason::NotFound {
                query: "Nowhereville, USA".to_string()
            })),
            Presentation::Error(NOT_FOUND_MESSAGE.to_string())
        );
        assert_eq!(
            present(&SearchOutcome::Failed(FailureReason::Upstream {
                status: Some(429),
                message: "Too many requests".to_string()
            })),
            Presentation::Error("Too many requests".to_string())
        );
    }
}
