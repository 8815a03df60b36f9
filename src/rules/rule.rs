//! Endpoint rule schema.
//!
//! The stored document is a JSON array of rule objects; every rule needs
//! all four fields with the right types. The method and target are only
//! checked for the rule actually being forwarded, so a broken entry never
//! affects lookups of other routes.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// One entry of the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointRule {
    /// Stage-qualified path, e.g. `prod/users`.
    pub endpoint: String,

    /// HTTP method, compared case-sensitively.
    pub method: String,

    /// Absolute URL the request is forwarded to.
    pub target_uri: String,

    /// Whether forwarding is permitted.
    pub allowed: bool,
}

/// Why a matched rule cannot be forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleValidationError {
    #[error("rule {endpoint:?}: invalid HTTP method {method:?}")]
    InvalidMethod { endpoint: String, method: String },

    #[error("rule {endpoint:?}: target_uri {uri:?} is not an absolute http(s) URL")]
    InvalidTargetUri { endpoint: String, uri: String },
}

impl EndpointRule {
    /// Parsed outbound method.
    pub fn http_method(&self) -> Option<Method> {
        Method::from_bytes(self.method.as_bytes()).ok()
    }

    /// Check that the rule describes a request that can be sent.
    pub fn forwardable(&self) -> Result<(Method, Url), RuleValidationError> {
        let method = self
            .http_method()
            .ok_or_else(|| RuleValidationError::InvalidMethod {
                endpoint: self.endpoint.clone(),
                method: self.method.clone(),
            })?;
        let url = Url::parse(&self.target_uri)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
            .ok_or_else(|| RuleValidationError::InvalidTargetUri {
                endpoint: self.endpoint.clone(),
                uri: self.target_uri.clone(),
            })?;
        Ok((method, url))
    }
}
