//! HTTP client for the MSG91 access-token verification API.
//!
//! Wraps `reqwest` with relay-oriented behavior: whatever the upstream
//! answers — success or error, any status — is captured verbatim so the
//! route handler can pass it through unchanged. Only transport-level
//! failures surface as errors.

use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// What the upstream answered: its exact status code and its body,
/// parsed as JSON when possible, relayed as a JSON string otherwise.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

/// Client for the MSG91 widget token-verification endpoint.
///
/// The verify URL is injected so tests can point at a mock server.
pub struct TokenVerifier {
    client: reqwest::Client,
    authkey: String,
    verify_url: String,
}

impl TokenVerifier {
    /// Creates a verifier. No timeout override beyond the client default;
    /// the relay adds no retry either.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(authkey: String, verify_url: String) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder()
            .user_agent("martsync/0.1 (token-relay)")
            .build()?;
        Ok(Self {
            client,
            authkey,
            verify_url,
        })
    }

    /// Forward the access token to MSG91 and capture its answer.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Http`] only on transport failure; upstream
    /// HTTP errors are part of the [`UpstreamResponse`].
    pub async fn verify(&self, access_token: &str) -> Result<UpstreamResponse, VerifyError> {
        let payload = json!({
            "authkey": self.authkey,
            "access-token": access_token,
        });

        let response = self
            .client
            .post(&self.verify_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(UpstreamResponse { status, body })
    }
}
