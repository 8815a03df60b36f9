//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the invocation endpoints
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Decode invocation payloads and encode results
//! - Serve until the shutdown signal fires

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::authorizer::{AuthorizerEvent, Authorizer};
use crate::config::GatewayConfig;
use crate::gateway::{GatewayEvent, Pipeline};
use crate::http::passthrough;
use crate::http::request::{request_id_of, UuidRequestId};
use crate::lifecycle::startup::{build_state, StartupError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub authorizer: Arc<Authorizer>,
    /// Run the authorizer in front of passthrough requests.
    pub gate_passthrough: bool,
}

impl AppState {
    pub fn new(pipeline: Pipeline, authorizer: Authorizer, gate_passthrough: bool) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            authorizer: Arc::new(authorizer),
            gate_passthrough,
        }
    }
}

/// HTTP host for the gateway entry points.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server from explicitly constructed state.
    pub fn new(config: GatewayConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Create a server, building storage and HTTP clients from the config.
    pub fn from_config(config: GatewayConfig) -> Result<Self, StartupError> {
        let state = build_state(&config)?;
        Ok(Self::new(config, state))
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/healthz", get(health))
            .route("/invoke/router", post(invoke_router))
            .route("/invoke/describe", post(invoke_describe))
            .route("/invoke/authorizer", post(invoke_authorizer));

        if config.server.passthrough {
            router = router.route("/{stage}/{*path}", any(passthrough::handler));
        }

        router
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.server.request_timeout_secs,
                    ))),
            )
    }

    /// The assembled router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            passthrough = self.config.server.passthrough,
            authorizer_gate = self.config.authorizer.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

fn make_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        request_id = %request_id_of(request),
        method = %request.method(),
        uri = %request.uri(),
    )
}

async fn health() -> &'static str {
    "ok"
}

/// Forwarding entry point.
async fn invoke_router(State(state): State<AppState>, body: Bytes) -> Response {
    match parse_payload::<GatewayEvent>(&body) {
        Ok(event) => Json(state.pipeline.handle(&event).await).into_response(),
        Err(rejection) => rejection,
    }
}

/// Rule description entry point.
async fn invoke_describe(State(state): State<AppState>, body: Bytes) -> Response {
    match parse_payload::<GatewayEvent>(&body) {
        Ok(event) => Json(state.pipeline.describe(&event).await).into_response(),
        Err(rejection) => rejection,
    }
}

/// Authorizer entry point. `Unauthorized` becomes a bare 401.
async fn invoke_authorizer(State(state): State<AppState>, body: Bytes) -> Response {
    let event = match parse_payload::<AuthorizerEvent>(&body) {
        Ok(event) => event,
        Err(rejection) => return rejection,
    };
    match state.authorizer.authorize(&event) {
        Ok(policy) => Json(policy).into_response(),
        Err(e) => (StatusCode::UNAUTHORIZED, e.to_string()).into_response(),
    }
}

fn parse_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Rejecting malformed invocation payload");
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": format!("Invalid event: {e}") })),
        )
            .into_response()
    })
}
