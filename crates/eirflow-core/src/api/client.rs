//! API client for the mobility dashboard backend.
//!
//! One method per backend endpoint. GETs and POSTs share a retry loop that
//! backs off exponentially on 429 responses; every other failure is
//! classified into an [`ApiError`] and returned with context.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{
    Coordinate, DashboardResponse, LoginRequest, LoginResponse, MessageResponse, Notification,
    NotificationQuery, NotificationStatus, NotificationsResponse, Registration, RerouteRequest,
    StatusUpdate,
};

use super::ApiError;

/// Backend used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// HTTP request timeout in seconds.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the dashboard backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for `base_url` (e.g. `http://localhost:5000`)
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send a request built by `build`, retrying with exponential backoff
    /// while the backend answers 429.
    async fn send_with_retry<F>(&self, method: &str, url: &str, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> Result<reqwest::RequestBuilder>,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()?
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .send_with_retry("GET", url, || {
                Ok(self
                    .client
                    .get(url)
                    .headers(self.auth_headers()?)
                    .query(query))
            })
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        let response = self
            .send_with_retry("POST", url, || {
                Ok(self
                    .client
                    .post(url)
                    .headers(self.auth_headers()?)
                    .json(body))
            })
            .await?;
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        // Some endpoints acknowledge with an empty body
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text)
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Auth =====

    /// Log in and return the backend's answer (token plus optional identity).
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let url = self.endpoint("api/auth/login");
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        debug!(username = username, "Authenticating");
        self.post(&url, &body).await
    }

    /// Create an account. Returns the backend's confirmation message.
    pub async fn register(&self, registration: &Registration) -> Result<String> {
        let url = self.endpoint("api/auth/register");
        let resp: MessageResponse = self.post(&url, registration).await?;
        Ok(resp
            .message
            .unwrap_or_else(|| "Registration successful".to_string()))
    }

    // ===== Dashboard =====

    /// Fetch the combined dashboard payload.
    pub async fn fetch_dashboard(&self) -> Result<DashboardResponse> {
        let url = self.endpoint("api/dashboard/");
        self.get(&url, &[]).await
    }

    /// Fetch the dashboard payload including routes between two points.
    pub async fn fetch_dashboard_with_route(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<DashboardResponse> {
        let url = self.endpoint("api/dashboard/");
        self.get(&url, &route_query(start, end)).await
    }

    // ===== Notifications =====

    pub async fn fetch_notifications(&self, query: &NotificationQuery) -> Result<Vec<Notification>> {
        let url = self.endpoint("api/notifications");
        let resp: NotificationsResponse = self.get(&url, &query.to_params()).await?;
        Ok(resp.into_vec())
    }

    pub async fn submit_reroute_request(&self, request: &RerouteRequest) -> Result<String> {
        let url = self.endpoint("api/notifications/reroute");
        let resp: MessageResponse = self.post(&url, request).await?;
        Ok(resp
            .message
            .unwrap_or_else(|| "Reroute request sent".to_string()))
    }

    pub async fn update_notification_status(
        &self,
        id: &str,
        status: NotificationStatus,
    ) -> Result<()> {
        let url = self.endpoint(&format!("api/notifications/{}/status", id));
        let _: MessageResponse = self.post(&url, &StatusUpdate { status }).await?;
        Ok(())
    }
}

fn route_query(start: Coordinate, end: Coordinate) -> Vec<(&'static str, String)> {
    vec![
        ("start_lat", start.0.to_string()),
        ("start_lon", start.1.to_string()),
        ("end_lat", end.0.to_string()),
        ("end_lon", end.1.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.endpoint("/api/dashboard/"),
            "http://localhost:5000/api/dashboard/"
        );
        assert_eq!(
            client.endpoint("api/auth/login"),
            "http://localhost:5000/api/auth/login"
        );
    }

    #[test]
    fn test_route_query_order() {
        let q = route_query((53.1, -6.2), (53.3, -6.4));
        let keys: Vec<&str> = q.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["start_lat", "start_lon", "end_lat", "end_lon"]);
        assert_eq!(q[1].1, "-6.2");
    }

    #[test]
    fn test_auth_header_only_with_token() {
        let client = ApiClient::new(DEFAULT_API_BASE_URL).unwrap();
        assert!(client.auth_headers().unwrap().is_empty());

        let authed = client.with_token(Some("abc".to_string()));
        let headers = authed.auth_headers().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Port 9 (discard) is closed on test machines
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client.fetch_dashboard().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::NetworkError(_))
        ));
    }
}
