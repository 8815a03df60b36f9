//! Inbound gateway event.

use serde::{Deserialize, Serialize};

use crate::rules::LookupKey;

/// The subset of an API gateway proxy event the router reads. Other fields
/// the platform sends are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    pub request_context: RequestContext,
    pub path: String,
    pub http_method: String,
    /// Raw request body; expected to hold JSON when present.
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestContext {
    pub stage: String,
}

impl GatewayEvent {
    pub fn new(stage: impl Into<String>, path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            request_context: RequestContext {
                stage: stage.into(),
            },
            path: path.into(),
            http_method: method.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Rule lookup key: stage concatenated with path, plus the method.
    pub fn lookup_key(&self) -> LookupKey {
        LookupKey::from_stage_path(&self.request_context.stage, &self.path, self.http_method.clone())
    }
}
