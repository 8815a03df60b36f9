//! Rule lookup.
//!
//! # Design Decisions
//! - Endpoint and method compared exactly (case-sensitive, no normalization)
//! - Linear scan; first match wins, duplicates are not an error
//! - Explicit `None` rather than a silent default

use crate::rules::rule::EndpointRule;

/// The (endpoint, method) pair a request is looked up by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    pub endpoint: String,
    pub method: String,
}

impl LookupKey {
    pub fn new(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
        }
    }

    /// Build a key from a gateway stage and path. The two are concatenated
    /// as-is.
    pub fn from_stage_path(stage: &str, path: &str, method: impl Into<String>) -> Self {
        Self::new(format!("{stage}{path}"), method)
    }

    fn matches(&self, rule: &EndpointRule) -> bool {
        rule.endpoint == self.endpoint && rule.method == self.method
    }
}

/// Return the first rule matching both endpoint and method.
pub fn find_rule<'a>(rules: &'a [EndpointRule], key: &LookupKey) -> Option<&'a EndpointRule> {
    rules.iter().find(|rule| key.matches(rule))
}

/// Return the first rule for `endpoint`, regardless of method.
pub fn find_by_endpoint<'a>(rules: &'a [EndpointRule], endpoint: &str) -> Option<&'a EndpointRule> {
    rules.iter().find(|rule| rule.endpoint == endpoint)
}
