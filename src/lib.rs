//! Serverless API gateway shim.
//!
//! Looks up an endpoint rule for each inbound gateway event in a JSON table
//! kept in object storage, and forwards allowed requests to the rule's
//! target. A separate token authorizer answers with IAM-style policies.

pub mod authorizer;
pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rules;

pub use config::GatewayConfig;
pub use gateway::{GatewayEvent, GatewayResponse, Pipeline, PipelineOptions};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
