//! Gateway invocation subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayEvent (stage, path, httpMethod, body)
//!     → pipeline.rs (lookup key, allow check, body validation)
//!     → rules (load + first match)
//!     → forwarder.rs (single outbound call)
//!     → response.rs (GatewayResponse envelope)
//! ```

pub mod event;
pub mod forwarder;
pub mod pipeline;
pub mod response;

pub use event::{GatewayEvent, RequestContext};
pub use forwarder::{ForwardError, Forwarder};
pub use pipeline::{Pipeline, PipelineOptions};
pub use response::GatewayResponse;
