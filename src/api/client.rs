//! HTTP client for the UP club backend.
//!
//! This module provides the `ApiClient` struct for the three calls the
//! core makes: exchanging a one-time auth code for a bearer token,
//! conditionally fetching the authenticated user's profile, and the
//! best-effort logout notification.

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use tracing::{debug, warn};

use crate::models::{AuthExchangeResponse, ProfileResponse};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Outcome of a conditional profile fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileFetch {
    /// The server returned a fresh body, with its validator when present.
    Fresh {
        profile: ProfileResponse,
        etag: Option<String>,
    },
    /// `304 Not Modified` - the snapshot behind the submitted validator
    /// is still current.
    NotModified,
}

/// API client for the UP club backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Exchange a one-time auth code (issued by the Telegram bot) for a
    /// bearer token and user record.
    pub async fn exchange_code(&self, code: &str) -> Result<AuthExchangeResponse> {
        let url = format!("{}/api/auth/callback", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await
            .context("Failed to send auth exchange request")?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .context("Failed to parse auth exchange response")
    }

    /// Fetch the authenticated user's profile, conditionally when a
    /// validator from a prior response is supplied.
    pub async fn fetch_profile(&self, token: &str, etag: Option<&str>) -> Result<ProfileFetch> {
        let url = format!("{}/api/users/me", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json");
        if let Some(etag) = etag {
            request = request.header(header::IF_NONE_MATCH, etag);
        }

        let response = request
            .send()
            .await
            .context("Failed to send profile request")?;

        if response.status() == StatusCode::NOT_MODIFIED {
            debug!("profile unchanged since last fetch");
            return Ok(ProfileFetch::NotModified);
        }

        let response = Self::check_response(response).await?;

        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let profile: ProfileResponse = response
            .json()
            .await
            .context("Failed to parse profile response")?;

        Ok(ProfileFetch::Fresh { profile, etag })
    }

    /// Tell the backend the session ended. Failures are logged and
    /// swallowed - local logout does not depend on the server.
    pub async fn notify_logout(&self, token: &str) {
        let url = format!("{}/api/auth/logout", self.base_url);

        match self.client.post(&url).bearer_auth(token).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "logout notification rejected");
            }
            Ok(_) => debug!("logout notification delivered"),
            Err(e) => warn!(error = %e, "logout notification failed"),
        }
    }
}
