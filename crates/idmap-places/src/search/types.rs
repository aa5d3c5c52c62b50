//! Values flowing in and out of a search run.

use idmap_core::{BoundingBox, CoreError, GeoPoint, LocationQuery};
use serde::{Deserialize, Serialize};

use crate::category::{self, CategoryToken};
use crate::radius::parse_start_km;
use crate::types::Place;

/// Raw form input, as typed by a user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub radius_km: Option<String>,
    #[serde(default)]
    pub progressive: Option<bool>,
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub location: LocationQuery,
    pub category: Option<CategoryToken>,
    pub name_hint: Option<String>,
    pub start_radius_km: Option<f64>,
    pub progressive: bool,
}

impl SearchRequest {
    #[must_use]
    pub fn new(location: LocationQuery) -> Self {
        Self {
            location,
            category: None,
            name_hint: None,
            start_radius_km: None,
            progressive: true,
        }
    }

    /// Normalizes free-text category input. Blank input clears the category.
    #[must_use]
    pub fn with_category(mut self, raw: &str) -> Self {
        self.category = category::normalize(raw);
        self
    }

    #[must_use]
    pub fn with_name_hint(mut self, name: &str) -> Self {
        let name = name.trim();
        self.name_hint = (!name.is_empty()).then(|| name.to_string());
        self
    }

    #[must_use]
    pub fn with_start_radius_km(mut self, km: f64) -> Self {
        self.start_radius_km = Some(km);
        self
    }

    #[must_use]
    pub fn with_progressive(mut self, progressive: bool) -> Self {
        self.progressive = progressive;
        self
    }

    /// Validates raw form input. Nothing touches the network before this
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] when the country is blank.
    pub fn from_form(form: &SearchForm) -> Result<Self, CoreError> {
        let location = LocationQuery::new(
            form.city.as_deref(),
            form.state.as_deref(),
            &form.country,
        )?;
        let mut request = Self::new(location).with_progressive(form.progressive.unwrap_or(true));
        if let Some(raw) = form.category.as_deref() {
            request = request.with_category(raw);
        }
        if let Some(name) = form.name.as_deref() {
            request = request.with_name_hint(name);
        }
        request.start_radius_km = form.radius_km.as_deref().and_then(parse_start_km);
        Ok(request)
    }
}

/// Geometry of a single places query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpatialFilter {
    Circle { center: GeoPoint, radius_m: u32 },
    Rect(BoundingBox),
}

impl SpatialFilter {
    /// Backend `filter` parameter: `circle:lon,lat,r` or `rect:w,s,e,n`.
    #[must_use]
    pub fn to_param(&self) -> String {
        match self {
            SpatialFilter::Circle { center, radius_m } => {
                format!("circle:{},{},{radius_m}", center.lon, center.lat)
            }
            SpatialFilter::Rect(b) => {
                format!("rect:{},{},{},{}", b.west, b.south, b.east, b.north)
            }
        }
    }

    #[must_use]
    pub fn radius_m(&self) -> Option<u32> {
        match self {
            SpatialFilter::Circle { radius_m, .. } => Some(*radius_m),
            SpatialFilter::Rect(_) => None,
        }
    }
}

/// One places query as sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceQuery {
    pub filter: SpatialFilter,
    pub category: Option<CategoryToken>,
    pub name: Option<String>,
}

/// Which stage of the search produced a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchStage {
    /// Requested category (plus name hint, if any).
    Direct,
    /// An alternate category tried after the direct search came back empty.
    CategoryFallback { category: CategoryToken },
    /// Name hint alone, category filter dropped.
    NameOnly,
}

impl MatchStage {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            MatchStage::Direct => "direct",
            MatchStage::CategoryFallback { .. } => "category fallback",
            MatchStage::NameOnly => "name only",
        }
    }
}

/// One unit of orchestration work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchAttempt {
    pub query: PlaceQuery,
    pub stage: MatchStage,
}

/// A place plus the stage that found it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiResult {
    #[serde(flatten)]
    pub place: Place,
    pub stage: MatchStage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The geocoder found nothing for the location text.
    NotFound { query: String },
    /// A backend call failed; `message` is the backend's own when it sent one.
    Upstream { status: Option<u16>, message: String },
}

/// Terminal result of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Never empty.
    Results(Vec<PoiResult>),
    Empty,
    Failed(FailureReason),
}

impl SearchOutcome {
    #[must_use]
    pub fn results(&self) -> &[PoiResult] {
        match self {
            SearchOutcome::Results(items) => items,
            SearchOutcome::Empty | SearchOutcome::Failed(_) => &[],
        }
    }
}

/// Identifier of one orchestration run; later runs have larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

/// Notifications emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    /// Display only: the attempt about to be sent.
    Progress {
        run: RunId,
        radius_m: Option<u32>,
        stage: MatchStage,
    },
    /// Sent exactly once per run that was not superseded.
    Finished { run: RunId, outcome: SearchOutcome },
}

/// What a completed run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run: RunId,
    pub outcome: SearchOutcome,
    /// Radii that were planned, in meters. Empty when geocoding failed.
    pub radii: Vec<u32>,
    /// Places queries actually sent.
    pub attempts: usize,
}
