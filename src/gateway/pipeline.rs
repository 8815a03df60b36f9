//! Invocation pipeline.
//!
//! One pipeline serves both router entry points:
//! - [`Pipeline::handle`]: look up the rule and forward the request
//! - [`Pipeline::describe`]: look up the first rule for the endpoint, any
//!   method, and report it without forwarding
//!
//! Decision order is fixed: load failure (500), no match (404), not
//! allowed (403), malformed body (400), then the outbound call.

use std::time::Instant;

use serde_json::Value;

use crate::config::ForwardingConfig;
use crate::gateway::event::GatewayEvent;
use crate::gateway::forwarder::Forwarder;
use crate::gateway::response::GatewayResponse;
use crate::observability::metrics;
use crate::rules::{EndpointRule, LookupKey, RuleLoadError, RuleStore};

/// Behavior switches for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Attach the inbound body (as JSON) to non-GET outbound requests.
    pub forward_body: bool,
    /// Emit one structured `info` event per invocation.
    pub structured_logging: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            forward_body: true,
            structured_logging: true,
        }
    }
}

impl From<&ForwardingConfig> for PipelineOptions {
    fn from(config: &ForwardingConfig) -> Self {
        Self {
            forward_body: config.forward_body,
            structured_logging: config.structured_logging,
        }
    }
}

/// Rule lookup plus forwarding, with injected storage and HTTP client.
#[derive(Debug, Clone)]
pub struct Pipeline {
    rules: RuleStore,
    forwarder: Forwarder,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(rules: RuleStore, forwarder: Forwarder, options: PipelineOptions) -> Self {
        Self {
            rules,
            forwarder,
            options,
        }
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Forwarding entry point.
    pub async fn handle(&self, event: &GatewayEvent) -> GatewayResponse {
        let start = Instant::now();
        let key = event.lookup_key();

        let response = match self.resolve(self.rules.lookup(&key).await) {
            Ok(rule) => match self.outbound_body(&rule, event) {
                Ok(body) => self.forwarder.forward(&rule, body.as_ref()).await,
                Err(response) => response,
            },
            Err(response) => response,
        };

        self.finish("router", &key, &response, start);
        response
    }

    /// Lookup-only entry point: reports the first rule for the endpoint.
    /// The event's method does not take part in the match.
    pub async fn describe(&self, event: &GatewayEvent) -> GatewayResponse {
        let start = Instant::now();
        let key = event.lookup_key();

        let response = match self.resolve(self.rules.lookup_endpoint(&key.endpoint).await) {
            Ok(rule) => GatewayResponse::json(
                200,
                &serde_json::json!({
                    "endpoint": rule.endpoint,
                    "method": rule.method,
                    "target_uri": rule.target_uri,
                }),
            ),
            Err(response) => response,
        };

        self.finish("describe", &key, &response, start);
        response
    }

    /// Find an allowed rule, or the response explaining why there is none.
    fn resolve(
        &self,
        lookup: Result<Option<EndpointRule>, RuleLoadError>,
    ) -> Result<EndpointRule, GatewayResponse> {
        match lookup {
            Ok(Some(rule)) if rule.allowed => Ok(rule),
            Ok(Some(_)) => Err(GatewayResponse::error(403, "Access not allowed")),
            Ok(None) => Err(GatewayResponse::error(404, "API Config not found")),
            Err(e) => {
                tracing::error!(key = %self.rules.key(), error = %e, "Rule table unavailable");
                Err(GatewayResponse::error(500, format!("Error loading config: {e}")))
            }
        }
    }

    fn outbound_body(
        &self,
        rule: &EndpointRule,
        event: &GatewayEvent,
    ) -> Result<Option<Value>, GatewayResponse> {
        if !self.options.forward_body || rule.method == "GET" {
            return Ok(None);
        }
        match event.body.as_deref() {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw).map(Some).map_err(|e| {
                GatewayResponse::error(400, format!("Invalid JSON body: {e}"))
            }),
        }
    }

    fn finish(&self, entry: &'static str, key: &LookupKey, response: &GatewayResponse, start: Instant) {
        metrics::record_invocation(entry, response.status_code, start);

        if self.options.structured_logging {
            tracing::info!(
                entry,
                endpoint = %key.endpoint,
                method = %key.method,
                status = response.status_code,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Invocation complete"
            );
        } else {
            tracing::debug!(entry, status = response.status_code, "Invocation complete");
        }
    }
}
