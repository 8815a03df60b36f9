//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → /invoke/{router,describe,authorizer}: JSON event in, JSON result out
//!     → /{stage}/{*path}: passthrough.rs (live request → GatewayEvent)
//!     → gateway pipeline / authorizer
//! ```

pub mod passthrough;
pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
