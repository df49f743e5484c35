//! Place search against a Nominatim-compatible geocoder.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::models::Place;

use super::client::REQUEST_TIMEOUT_SECS;
use super::ApiError;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Queries shorter than this never produce suggestions.
pub const MIN_SUGGESTION_QUERY_LEN: usize = 3;

/// Number of suggestions offered while typing.
pub const SUGGESTION_LIMIT: usize = 5;

/// Nominatim's usage policy requires an identifying User-Agent.
const USER_AGENT: &str = concat!("eirflow/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build geocoding client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Free-text search returning at most `limit` places.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>> {
        let url = format!("{}/search", self.base_url);
        debug!(query = query, limit = limit, "Geocoding");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("q", query.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to search for '{}'", query))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse geocoding response for '{}'", query))
    }

    /// Autocomplete suggestions. Short queries return nothing without a
    /// request.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<Place>> {
        if !wants_suggestions(query) {
            return Ok(Vec::new());
        }
        self.search(query.trim(), SUGGESTION_LIMIT).await
    }

    /// Best match for `query`, if any.
    pub async fn resolve(&self, query: &str) -> Result<Option<Place>> {
        let places = self.search(query.trim(), 1).await?;
        Ok(places.into_iter().find(|p| p.coordinate().is_some()))
    }
}

pub fn wants_suggestions(query: &str) -> bool {
    query.trim().chars().count() >= MIN_SUGGESTION_QUERY_LEN
}
