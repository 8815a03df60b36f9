//! Live HTTP adapter.
//!
//! Turns `ANY /{stage}/{*path}` into a [`GatewayEvent`], optionally gated by
//! the authorizer, and renders the pipeline's [`GatewayResponse`] as the
//! HTTP response.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    response::{IntoResponse, Response},
};

use crate::authorizer::Effect;
use crate::gateway::{GatewayEvent, GatewayResponse};
use crate::http::server::AppState;

/// Resource string handed to the authorizer for a passthrough request.
pub fn local_method_arn(stage: &str, method: &Method, path: &str) -> String {
    format!("arn:aws:execute-api:local:gateway-shim/{stage}/{method}{path}")
}

pub async fn handler(
    State(state): State<AppState>,
    Path((stage, rest)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("/{rest}");

    if state.gate_passthrough {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let resource = local_method_arn(&stage, &method, &path);

        match state.authorizer.authorize_token(token, &resource) {
            Ok(policy) if policy.effect() == Some(Effect::Allow) => {}
            Ok(_) => {
                tracing::info!(%resource, "Passthrough request denied by authorizer");
                return GatewayResponse::error(403, "User is not authorized to access this resource")
                    .into_response();
            }
            Err(e) => {
                return GatewayResponse::error(401, e.to_string()).into_response();
            }
        }
    }

    let mut event = GatewayEvent::new(stage, path, method.as_str());
    // GET bodies are never forwarded, so they are not decoded either.
    if !body.is_empty() && method != Method::GET {
        match String::from_utf8(body.to_vec()) {
            Ok(text) => event = event.with_body(text),
            Err(_) => {
                return GatewayResponse::error(400, "Request body is not valid UTF-8").into_response()
            }
        }
    }

    state.pipeline.handle(&event).await.into_response()
}
