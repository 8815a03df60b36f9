//! The hosting server end to end: invoke endpoints, passthrough and gating.

use gateway_shim::gateway::PipelineOptions;
use reqwest::StatusCode;

mod common;

async fn items_gateway(gate: bool) -> (std::net::SocketAddr, common::Recorder, gateway_shim::lifecycle::Shutdown) {
    let (backend, recorder) =
        common::start_recording_backend(200, Some("application/json"), br#"{"items":[]}"#).await;
    let table = serde_json::json!([
        {
            "endpoint": "dev/items",
            "method": "GET",
            "target_uri": format!("http://{backend}/items"),
            "allowed": true,
        },
        {
            "endpoint": "dev/orders",
            "method": "POST",
            "target_uri": format!("http://{backend}/orders"),
            "allowed": true,
        }
    ])
    .to_string();
    let pipeline = common::pipeline(table, PipelineOptions::default()).await;
    let (addr, shutdown) = common::start_gateway(pipeline, gate).await;
    (addr, recorder, shutdown)
}

#[tokio::test]
async fn test_health() {
    let (addr, _, shutdown) = items_gateway(false).await;

    let response = common::http_client()
        .get(format!("http://{addr}/healthz"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
    shutdown.trigger();
}

#[tokio::test]
async fn test_passthrough_relays_backend() {
    let (addr, recorder, shutdown) = items_gateway(false).await;

    let response = common::http_client()
        .get(format!("http://{addr}/dev/items"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(response.text().await.unwrap(), r#"{"items":[]}"#);
    assert_eq!(recorder.lock().unwrap()[0].path, "/items");
    shutdown.trigger();
}

#[tokio::test]
async fn test_passthrough_forwards_post_body() {
    let (addr, recorder, shutdown) = items_gateway(false).await;

    let response = common::http_client()
        .post(format!("http://{addr}/dev/orders"))
        .body(r#"{"sku": "A-1", "qty": 2}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let calls = recorder.lock().unwrap().clone();
    assert_eq!(calls[0].method, "POST");
    let sent: serde_json::Value = serde_json::from_str(&calls[0].body).unwrap();
    assert_eq!(sent["qty"], 2);
    shutdown.trigger();
}

#[tokio::test]
async fn test_passthrough_unknown_route_is_404() {
    let (addr, recorder, shutdown) = items_gateway(false).await;

    let response = common::http_client()
        .delete(format!("http://{addr}/dev/items"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "API Config not found");
    assert!(recorder.lock().unwrap().is_empty());
    shutdown.trigger();
}

#[tokio::test]
async fn test_gated_passthrough_requires_token() {
    let (addr, recorder, shutdown) = items_gateway(true).await;
    let client = common::http_client();
    let url = format!("http://{addr}/dev/items");

    let missing = client.get(&url).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let malformed = client
        .get(&url)
        .header("authorization", "Basic")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);

    let denied = client
        .get(&url)
        .header("authorization", "Basic key=x")
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    assert!(recorder.lock().unwrap().is_empty());

    let allowed = client
        .get(&url)
        .header("authorization", "Basic key=y")
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    assert_eq!(recorder.lock().unwrap().len(), 1);
    shutdown.trigger();
}

#[tokio::test]
async fn test_invoke_describe_wraps_result() {
    let (addr, recorder, shutdown) = items_gateway(false).await;

    let response = common::http_client()
        .post(format!("http://{addr}/invoke/describe"))
        .json(&serde_json::json!({
            "requestContext": { "stage": "dev" },
            "path": "/items",
            "httpMethod": "GET",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let payload: serde_json::Value = response.json().await.unwrap();
    assert_eq!(payload["statusCode"], 200);
    let described: serde_json::Value =
        serde_json::from_str(payload["body"].as_str().unwrap()).unwrap();
    assert_eq!(described["endpoint"], "dev/items");
    assert!(recorder.lock().unwrap().is_empty());
    shutdown.trigger();
}

#[tokio::test]
async fn test_invoke_router_forwards() {
    let (addr, recorder, shutdown) = items_gateway(false).await;

    let response = common::http_client()
        .post(format!("http://{addr}/invoke/router"))
        .json(&serde_json::json!({
            "requestContext": { "stage": "dev" },
            "path": "/orders",
            "httpMethod": "POST",
            "body": "{\"sku\": \"B-2\"}",
        }))
        .send()
        .await
        .unwrap();

    let payload: serde_json::Value = response.json().await.unwrap();
    assert_eq!(payload["statusCode"], 200);
    assert_eq!(payload["body"], r#"{"items":[]}"#);
    assert_eq!(payload["headers"]["Content-Type"], "application/json");
    assert_eq!(recorder.lock().unwrap()[0].path, "/orders");
    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_generated_and_echoed() {
    let (addr, _, shutdown) = items_gateway(false).await;
    let client = common::http_client();

    let generated = client
        .get(format!("http://{addr}/healthz"))
        .send()
        .await
        .unwrap();
    let id = generated.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok(), "{id}");

    let echoed = client
        .get(format!("http://{addr}/healthz"))
        .header("x-request-id", "caller-supplied-42")
        .send()
        .await
        .unwrap();
    assert_eq!(echoed.headers().get("x-request-id").unwrap(), "caller-supplied-42");
    shutdown.trigger();
}

#[tokio::test]
async fn test_passthrough_get_ignores_undecodable_body() {
    let (addr, recorder, shutdown) = items_gateway(false).await;
    let client = common::http_client();

    let get = client
        .get(format!("http://{addr}/dev/items"))
        .body(vec![0xff, 0xfe, 0xfd])
        .send()
        .await
        .unwrap();
    assert_eq!(get.status(), StatusCode::OK);
    assert!(recorder.lock().unwrap()[0].body.is_empty());

    let post = client
        .post(format!("http://{addr}/dev/orders"))
        .body(vec![0xff, 0xfe, 0xfd])
        .send()
        .await
        .unwrap();
    assert_eq!(post.status(), StatusCode::BAD_REQUEST);
    assert_eq!(recorder.lock().unwrap().len(), 1);
    shutdown.trigger();
}
