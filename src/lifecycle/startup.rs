//! Startup orchestration.
//!
//! Builds the long-lived handles (rule store, HTTP client, authorizer) once
//! from validated configuration. Any failure here is fatal.

use std::time::Duration;

use thiserror::Error;

use crate::authorizer::Authorizer;
use crate::config::GatewayConfig;
use crate::gateway::{Forwarder, Pipeline, PipelineOptions};
use crate::http::server::AppState;
use crate::rules::{RuleLoadError, RuleStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    RuleStore(#[from] RuleLoadError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Assemble handler state from configuration.
pub fn build_state(config: &GatewayConfig) -> Result<AppState, StartupError> {
    let rules = RuleStore::from_config(&config.rules)?;
    let forwarder = Forwarder::new(Duration::from_secs(config.forwarding.connect_timeout_secs))?;
    let options = PipelineOptions::from(&config.forwarding);

    tracing::info!(
        rules_key = %rules.key(),
        forward_body = options.forward_body,
        structured_logging = options.structured_logging,
        "Pipeline initialized"
    );

    Ok(AppState::new(
        Pipeline::new(rules, forwarder, options),
        Authorizer::default(),
        config.authorizer.enabled,
    ))
}
