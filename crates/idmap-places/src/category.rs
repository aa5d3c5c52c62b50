//! Category vocabulary: free-text synonyms, sanitizing, and the alternate
//! category table consulted when a direct search comes back empty.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A canonical Geoapify category string such as `commercial.supermarket`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryToken(String);

impl CategoryToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-case phrase → canonical token.
pub const SYNONYMS: &[(&str, &str)] = &[
    ("coffee", "catering.cafe"),
    ("cafe", "catering.cafe"),
    ("coffee shop", "catering.cafe"),
    ("supermarket", "commercial.supermarket"),
    ("grocery", "commercial.supermarket"),
    ("grocery store", "commercial.supermarket"),
    ("super mart", "commercial.supermarket"),
    ("convenience", "commercial.convenience"),
    ("convenience store", "commercial.convenience"),
    ("bodega", "commercial.convenience"),
    ("corner store", "commercial.convenience"),
    ("produce", "commercial.food_and_drink.fruit_and_vegetable"),
    ("farmers market", "commercial.food_and_drink.fruit_and_vegetable"),
    ("market", "commercial.marketplace"),
    ("marketplace", "commercial.marketplace"),
    ("restaurant", "catering.restaurant"),
    ("bar", "entertainment.bar"),
    ("pub", "entertainment.pub"),
    ("bakery", "catering.bakery"),
    ("cinema", "entertainment.cinema"),
    ("pharmacy", "healthcare.pharmacy"),
    ("hospital", "healthcare.hospital"),
    ("gas station", "service.vehicle.fuel"),
    ("fuel", "service.vehicle.fuel"),
    ("gas", "service.vehicle.fuel"),
    ("petrol", "service.vehicle.fuel"),
    ("petrol station", "service.vehicle.fuel"),
];

/// Canonical token → semantically adjacent tokens, tried in order.
pub const FALLBACKS: &[(&str, &[&str])] = &[
    (
        "commercial.supermarket",
        &[
            "commercial.convenience",
            "commercial.food_and_drink.fruit_and_vegetable",
            "commercial.discount_store",
        ],
    ),
    (
        "catering.fast_food",
        &[
            "catering.restaurant",
            "catering.fast_food.pizza",
            "catering.fast_food.burger",
            "catering.fast_food.sandwich",
        ],
    ),
    ("commercial.shopping_mall", &["commercial"]),
];

static NUMERIC_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\s*:\d+)+$").expect("valid regex"));

/// Trims and strips trailing `:<digits>` suffixes (`"catering.cafe:12"`).
#[must_use]
pub fn sanitize(raw: &str) -> String {
    NUMERIC_SUFFIX.replace(raw.trim(), "").trim().to_string()
}

/// Maps free text onto the category vocabulary.
///
/// Lookup is case-insensitive. Text that is already canonical, or that the
/// table does not know, passes through (sanitized) unchanged. Returns `None`
/// for blank input.
#[must_use]
pub fn normalize(raw: &str) -> Option<CategoryToken> {
    let cleaned = sanitize(raw);
    if cleaned.is_empty() {
        return None;
    }
    let lowered = cleaned.to_lowercase();
    let token = SYNONYMS
        .iter()
        .find(|(phrase, _)| *phrase == lowered)
        .map_or(cleaned, |(_, canonical)| (*canonical).to_string());
    Some(CategoryToken(token))
}

/// Alternate categories for `token`, in the order they should be tried.
/// Unknown tokens have none.
#[must_use]
pub fn fallbacks_for(token: &CategoryToken) -> Vec<CategoryToken> {
    FALLBACKS
        .iter()
        .find(|(key, _)| *key == token.as_str())
        .map(|(_, alts)| {
            alts.iter()
                .filter(|alt| **alt != token.as_str())
                .map(|alt| CategoryToken((*alt).to_string()))
                .collect()
        })
        .unwrap_or_default()
}
