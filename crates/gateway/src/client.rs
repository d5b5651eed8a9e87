//! HTTP client for the Generative Language REST API.
//!
//! [`GeminiClient`] holds the connection configuration and the session
//! gate shared by all operations. The per-operation request/response
//! logic lives in [`crate::story`], [`crate::image`], and
//! [`crate::video`].

use std::sync::Arc;

use cineboard_session::Session;

use crate::error::GatewayError;
use crate::video::VideoPollConfig;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the generative backend.
///
/// Cheap to clone behind an `Arc`; one instance serves every concurrent
/// operation (reqwest pools connections internally).
pub struct GeminiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) session: Arc<Session>,
    pub(crate) poll: VideoPollConfig,
}

impl GeminiClient {
    /// Create a client against the production endpoint.
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            session,
            poll: VideoPollConfig::default(),
        }
    }

    /// Override the base URL (local emulators, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the video poll configuration.
    pub fn with_poll_config(mut self, poll: VideoPollConfig) -> Self {
        self.poll = poll;
        self
    }

    // ---- session gate ----

    /// Resolve the credential for a call, failing fast before any network
    /// I/O when the session is deactivated or no secret resolves.
    pub(crate) fn resolve_credential(&self) -> Result<String, GatewayError> {
        if !self.session.is_activated() {
            return Err(GatewayError::SessionInactive);
        }
        self.session
            .resolved_secret()
            .ok_or(GatewayError::CredentialMissing)
    }

    // ---- request plumbing ----

    /// POST a `generateContent` request for the given model.
    pub(crate) async fn post_generate_content(
        &self,
        model_id: &str,
        secret: &str,
        body: &serde_json::Value,
    ) -> Result<crate::wire::GenerateContentResponse, GatewayError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model_id);
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", secret)
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`GatewayError::Backend`] containing the
    /// status and body text on failure.
    pub(crate) async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
