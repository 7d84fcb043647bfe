//! HTTP transport for analytics submissions.
//!
//! The reporter only needs "POST this JSON, tell me the status". Keeping
//! that behind a trait lets tests substitute a scripted transport.

use async_trait::async_trait;
use tracing::trace;

use crate::endpoint;
use crate::error::TransportError;
use crate::payload::AnalyticsPayload;

/// Posts payloads to a collection endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `payload` as JSON to `url` and return the HTTP status code
    async fn post_json(&self, url: &str, payload: &AnalyticsPayload)
    -> Result<u16, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client identifying itself with the platform version.
    ///
    /// The overall deadline is enforced by the reporter, not the client.
    pub fn new(version: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(endpoint::user_agent(version))
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Wrap an existing client (shared connection pool)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &AnalyticsPayload,
    ) -> Result<u16, TransportError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        trace!(status, "Analytics endpoint responded");
        Ok(status)
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}
