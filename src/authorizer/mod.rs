//! Token authorizer subsystem.
//!
//! # Data Flow
//! ```text
//! AuthorizerEvent (authorizationToken, methodArn)
//!     → token.rs (parse "<scheme> <key>=<value>")
//!     → policy.rs (TokenPolicy decides Allow/Deny)
//!     → AuthorizerResponse (principal "user", single invoke statement)
//! ```
//!
//! # Design Decisions
//! - Malformed tokens are an `Err`, not a Deny policy; the host turns it
//!   into 401 so the platform rejects the call outright
//! - The decision is behind `TokenPolicy`; the shipped policy is a placeholder

pub mod policy;
pub mod token;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::metrics;

pub use policy::{generate_policy, AuthorizerResponse, Effect, PlaceholderPolicy, TokenPolicy};
pub use token::AuthToken;

/// Fixed principal reported in every policy.
pub const PRINCIPAL_ID: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
}

/// Token authorizer trigger event.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerEvent {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub authorization_token: Option<String>,
    pub method_arn: String,
}

#[derive(Debug, Clone)]
pub struct Authorizer {
    policy: Arc<dyn TokenPolicy>,
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::new(Arc::new(PlaceholderPolicy))
    }
}

impl Authorizer {
    pub fn new(policy: Arc<dyn TokenPolicy>) -> Self {
        Self { policy }
    }

    pub fn authorize(&self, event: &AuthorizerEvent) -> Result<AuthorizerResponse, AuthError> {
        let token = event
            .authorization_token
            .as_deref()
            .ok_or(AuthError::Unauthorized)
            .inspect_err(|_| metrics::record_authorizer_decision("Unauthorized"))?;
        self.authorize_token(token, &event.method_arn)
    }

    /// Parse `token` and produce a policy for `resource`.
    pub fn authorize_token(
        &self,
        token: &str,
        resource: &str,
    ) -> Result<AuthorizerResponse, AuthError> {
        let parsed: AuthToken = token.parse().inspect_err(|_| {
            tracing::debug!(resource, "Rejecting malformed authorization token");
            metrics::record_authorizer_decision("Unauthorized");
        })?;

        let effect = self.policy.evaluate(&parsed);
        metrics::record_authorizer_decision(effect.as_str());
        tracing::debug!(scheme = %parsed.scheme, %effect, resource, "Authorization decided");

        Ok(generate_policy(PRINCIPAL_ID, effect, resource))
    }
}
