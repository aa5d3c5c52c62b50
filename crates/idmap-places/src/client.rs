//! HTTP client for the Geoapify geocoding and places APIs.
//!
//! Wraps `reqwest` with API key handling, default query parameters and
//! upstream error extraction. The raw JSON methods back the HTTP proxy
//! endpoints; the [`PlacesBackend`] impl backs the search pipeline.

use std::time::Duration;

use async_trait::async_trait;
use idmap_core::{AppConfig, SearchArea};
use reqwest::{Client, Url};

use crate::category::CategoryToken;
use crate::error::PlacesError;
use crate::geocode::resolve_area;
use crate::search::{PlaceQuery, PlacesBackend};
use crate::types::{FeatureCollection, Place};

pub const DEFAULT_GEOCODE_URL: &str = "https://api.geoapify.com/v1/geocode/search";
pub const DEFAULT_PLACES_URL: &str = "https://api.geoapify.com/v2/places";
/// Sent when a places query names no category.
pub const DEFAULT_CATEGORY: &str = "commercial";
pub const DEFAULT_LIMIT: u32 = 100;

const DEFAULT_USER_AGENT: &str = "idmap/0.1 (accessibility-mapper)";

/// Client for the Geoapify REST APIs.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct GeoapifyClient {
    client: Client,
    api_key: String,
    geocode_url: Url,
    places_url: Url,
    limit: u32,
}

impl GeoapifyClient {
    /// Creates a client pointed at the production endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_urls(api_key, timeout_secs, DEFAULT_GEOCODE_URL, DEFAULT_PLACES_URL)
    }

    /// Creates a client with custom endpoint URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if either
    /// URL does not parse.
    pub fn with_base_urls(
        api_key: &str,
        timeout_secs: u64,
        geocode_url: &str,
        places_url: &str,
    ) -> Result<Self, PlacesError> {
        Self::build(api_key, timeout_secs, DEFAULT_USER_AGENT, geocode_url, places_url)
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`GeoapifyClient::with_base_urls`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PlacesError> {
        Ok(Self::build(
            &config.geoapify_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.geocode_base_url,
            &config.places_base_url,
        )?
        .with_limit(config.result_limit))
    }

    /// Overrides the places result cap (default [`DEFAULT_LIMIT`]).
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    fn build(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        geocode_url: &str,
        places_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            geocode_url: parse_url(geocode_url)?,
            places_url: parse_url(places_url)?,
            limit: DEFAULT_LIMIT,
        })
    }

    /// Geocodes free text and returns the backend's JSON unchanged.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Upstream`] on a non-2xx status.
    /// - [`PlacesError::Http`] on network failure or timeout.
    /// - [`PlacesError::Deserialize`] if the body is not JSON.
    pub async fn geocode_raw(&self, text: &str) -> Result<serde_json::Value, PlacesError> {
        let url = self.build_url(&self.geocode_url, &[("text", text)]);
        self.request_json(&url, "Geocode").await
    }

    /// Runs one places query and returns the backend's JSON unchanged.
    ///
    /// `filter` is passed through as-is (`circle:lon,lat,r` or
    /// `rect:w,s,e,n`). A missing category becomes [`DEFAULT_CATEGORY`]; a
    /// missing limit becomes the client's configured limit.
    ///
    /// # Errors
    ///
    /// Same as [`GeoapifyClient::geocode_raw`].
    pub async fn places_raw(
        &self,
        filter: &str,
        categories: Option<&str>,
        name: Option<&str>,
        limit: Option<u32>,
    ) -> Result<serde_json::Value, PlacesError> {
        let limit = limit.unwrap_or(self.limit).to_string();
        let categories = categories
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        let mut params = vec![("filter", filter), ("categories", categories)];
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            params.push(("name", name));
        }
        params.push(("limit", &limit));

        let url = self.build_url(&self.places_url, &params);
        self.request_json(&url, "Places").await
    }

    /// Appends `params` and then `apiKey` to `base`, percent-encoding every
    /// value.
    fn build_url(&self, base: &Url, params: &[(&str, &str)]) -> Url {
        let mut url = base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("apiKey", &self.api_key);
        }
        url
    }

    /// Sends a GET request and parses the body as JSON.
    ///
    /// `what` names the endpoint in error messages. The request URL carries
    /// the API key, so it never appears in errors or logs.
    async fn request_json(&self, url: &Url, what: &str) -> Result<serde_json::Value, PlacesError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        tracing::debug!(endpoint = what, status = status.as_u16(), bytes = body.len(), "geoapify response");

        if !status.is_success() {
            let message = upstream_message(&body).unwrap_or_else(|| {
                format!("{what} request failed (status {})", status.as_u16())
            });
            return Err(PlacesError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: format!("{what} response"),
            source: e,
        })
    }
}

#[async_trait]
impl PlacesBackend for GeoapifyClient {
    async fn geocode(&self, location_text: &str) -> Result<SearchArea, PlacesError> {
        let body = self.geocode_raw(location_text).await?;
        let collection: FeatureCollection =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("geocode(text={location_text})"),
                source: e,
            })?;
        resolve_area(location_text, &collection)
    }

    async fn search_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, PlacesError> {
        let filter = query.filter.to_param();
        let body = self
            .places_raw(
                &filter,
                query.category.as_ref().map(CategoryToken::as_str),
                query.name.as_deref(),
                None,
            )
            .await?;
        let collection: FeatureCollection =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("places(filter={filter})"),
                source: e,
            })?;
        Ok(collection
            .features
            .into_iter()
            .filter_map(Place::from_feature)
            .collect())
    }
}

fn parse_url(raw: &str) -> Result<Url, PlacesError> {
    Url::parse(raw).map_err(|e| PlacesError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// The backend's own explanation of a failed request: the body's `error`
/// string, else its `message` string.
fn upstream_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| json.get(key).and_then(serde_json::Value::as_str))
        .filter(|msg| !msg.trim().is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
