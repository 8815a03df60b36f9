//! Endpoint rule subsystem.
//!
//! # Data Flow
//! ```text
//! Invocation (stage + path, method)
//!     → store.rs (fetch object, UTF-8 decode, JSON parse)
//!     → rule.rs (typed schema: four required fields)
//!     → matcher.rs (linear scan, first match wins)
//!     → Return: matched EndpointRule or None
//! ```
//!
//! # Design Decisions
//! - Table re-read on every invocation: no cache, no TTL, no invalidation
//! - Only the shape is checked table-wide; a rule's method and target are
//!   checked when that rule is forwarded
//! - Deterministic: same table and key always match the same rule

pub mod matcher;
pub mod rule;
pub mod store;

pub use matcher::{find_by_endpoint, find_rule, LookupKey};
pub use rule::{EndpointRule, RuleValidationError};
pub use store::{RuleLoadError, RuleStore};
