//! Outbound request forwarding.
//!
//! # Responsibilities
//! - Build the outbound request from a matched rule, rejecting unusable
//!   methods and targets
//! - Send it once (no retry, no circuit breaking)
//! - Map the outcome onto a gateway response
//!
//! # Outcome mapping
//! - upstream < 400 → status and body relayed verbatim
//! - upstream >= 400 → status relayed, body `HTTPError: <reason>`
//! - connect / transport / timeout failure → 500 `URLError: <reason>`
//! - anything else (bad rule, undecodable body) → 500 `Unexpected error: <reason>`

use std::time::Duration;

use axum::http::{header, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::gateway::response::GatewayResponse;
use crate::rules::EndpointRule;

/// Why forwarding did not produce a relayable upstream response.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("HTTPError: {reason}")]
    Status { status: StatusCode, reason: String },

    #[error("URLError: {0}")]
    Network(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ForwardError {
    pub fn status_code(&self) -> u16 {
        match self {
            ForwardError::Status { status, .. } => status.as_u16(),
            ForwardError::Network(_) | ForwardError::Unexpected(_) => 500,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            ForwardError::Network(describe(&err))
        } else {
            ForwardError::Unexpected(describe(&err))
        }
    }
}

impl From<ForwardError> for GatewayResponse {
    fn from(err: ForwardError) -> Self {
        GatewayResponse::raw(err.status_code(), err.to_string())
    }
}

/// reqwest's top-level message omits the cause; append the innermost source.
fn describe(err: &reqwest::Error) -> String {
    let Some(mut cause) = std::error::Error::source(err) else {
        return err.to_string();
    };
    while let Some(next) = cause.source() {
        cause = next;
    }
    format!("{err}: {cause}")
}

/// Sends matched requests to their target.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    /// Build a forwarder with its own HTTP client.
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Use an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Forward to `rule.target_uri` using `rule.method`, attaching `body`
    /// as JSON when given.
    pub async fn forward(&self, rule: &EndpointRule, body: Option<&Value>) -> GatewayResponse {
        match self.send(rule, body).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    target_uri = %rule.target_uri,
                    method = %rule.method,
                    error = %err,
                    "Forwarding failed"
                );
                err.into()
            }
        }
    }

    async fn send(
        &self,
        rule: &EndpointRule,
        body: Option<&Value>,
    ) -> Result<GatewayResponse, ForwardError> {
        let (method, url) = rule
            .forwardable()
            .map_err(|e| ForwardError::Unexpected(e.to_string()))?;

        let mut request = self
            .client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ForwardError::from_reqwest)?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            return Err(ForwardError::Status {
                status,
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ForwardError::Unexpected(describe(&e)))?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| ForwardError::Unexpected(format!("upstream body is not UTF-8: {e}")))?;

        tracing::debug!(target_uri = %rule.target_uri, status = status.as_u16(), "Upstream responded");

        let relayed = GatewayResponse::raw(status.as_u16(), text);
        Ok(match content_type {
            Some(content_type) => relayed.with_header("Content-Type", content_type),
            None => relayed,
        })
    }
}
