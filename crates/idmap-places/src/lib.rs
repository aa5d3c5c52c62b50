pub mod category;
pub mod client;
pub mod error;
pub mod geocode;
pub mod present;
pub mod radius;
pub mod search;
pub mod types;

pub use category::CategoryToken;
pub use client::GeoapifyClient;
pub use error::PlacesError;
pub use present::{present, DisplayItem, Presentation};
pub use radius::RadiusLadder;
pub use search::{
    EventSink, FailureReason, MatchStage, PlaceQuery, PlaceSearch, PlacesBackend, PoiResult,
    RunId, RunReport, RunTracker, SearchEvent, SearchForm, SearchOutcome, SearchRequest,
    SpatialFilter,
};
pub use types::Place;
