use thiserror::Error;

use crate::search::FailureReason;

/// Errors returned by the geocode and places backends.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client, including
    /// client-side timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The geocoder found no usable match.
    #[error("location not found: {query}")]
    NotFound { query: String },

    /// A single backend call exceeded the attempt deadline.
    #[error("request timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl PlacesError {
    /// Collapses a backend error into the reason carried by a failed run.
    ///
    /// Everything except [`PlacesError::NotFound`] is an upstream failure;
    /// the backend's own message is kept verbatim when one was supplied.
    #[must_use]
    pub fn into_failure(self) -> FailureReason {
        match self {
            PlacesError::NotFound { query } => FailureReason::NotFound { query },
            PlacesError::Upstream { status, message } => FailureReason::Upstream {
                status: Some(status),
                message,
            },
            PlacesError::Http(err) => {
                let status = err.status().map(|s| s.as_u16());
                let message = if err.is_timeout() {
                    "request timed out".to_string()
                } else {
                    err.to_string()
                };
                FailureReason::Upstream { status, message }
            }
            other @ (PlacesError::Deserialize { .. }
            | PlacesError::Timeout { .. }
            | PlacesError::InvalidBaseUrl { .. }) => FailureReason::Upstream {
                status: None,
                message: other.to_string(),
            },
        }
    }
}
