pub mod app_config;
pub mod config;
pub mod geo;
pub mod reviews;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{BoundingBox, GeoPoint, LocationQuery, SearchArea};
pub use reviews::{NewReview, Review, ReviewFilter, ReviewId, ReviewLocation};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates { lat: f64, lon: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
