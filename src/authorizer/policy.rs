//! Policy documents and token decisions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::authorizer::token::AuthToken;

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

/// What the authorizer hands back to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

impl AuthorizerResponse {
    /// Effect of the (single) invoke statement.
    pub fn effect(&self) -> Option<Effect> {
        self.policy_document.statement.first().map(|s| s.effect)
    }
}

/// Single-statement invoke policy for `resource`.
pub fn generate_policy(
    principal_id: impl Into<String>,
    effect: Effect,
    resource: impl Into<String>,
) -> AuthorizerResponse {
    AuthorizerResponse {
        principal_id: principal_id.into(),
        policy_document: PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                action: INVOKE_ACTION.to_string(),
                effect,
                resource: resource.into(),
            }],
        },
    }
}

/// Decides the effect for a well-formed token.
pub trait TokenPolicy: Send + Sync + fmt::Debug {
    fn evaluate(&self, token: &AuthToken) -> Effect;
}

/// Stand-in decision: denies the literal value `"x"`, allows everything
/// else. It does not verify credentials of any kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderPolicy;

impl TokenPolicy for PlaceholderPolicy {
    fn evaluate(&self, token: &AuthToken) -> Effect {
        if token.value == "x" {
            Effect::Deny
        } else {
            Effect::Allow
        }
    }
}
