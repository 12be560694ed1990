//! Integration tests for greenrack-catalog API endpoints
//!
//! Runs the router against an in-memory database. The POS client points at
//! an unreachable address, so every test that must not depend on the vendor
//! exercises paths that never call it; passthrough endpoints are asserted
//! to surface an upstream failure instead.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

use greenrack_catalog::services::PosClient;
use greenrack_catalog::{build_router, db, AppState};
use greenrack_common::cache::{PRODUCTS_ALL_KEY, PRODUCTS_TTL};
use greenrack_common::TtlCache;

async fn setup_state() -> AppState {
    let pool = db::connect_in_memory().await.expect("in-memory pool");
    db::init_schema(&pool).await.expect("schema");
    // Port 9 (discard) is never listening; tests that reach the POS expect
    // an upstream error.
    let pos = PosClient::new("http://127.0.0.1:9", "Basic test").expect("pos client");
    AppState::new(pool, Arc::new(pos), TtlCache::new())
}

async fn setup_app() -> (axum::Router, AppState) {
    let state = setup_state().await;
    (build_router(state.clone()), state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(body: Body) -> Value {
    let bytes = http_body_util::BodyExt::collect(body)
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

async fn body_bytes(body: Body) -> Vec<u8> {
    http_body_util::BodyExt::collect(body)
        .await
        .expect("read body")
        .to_bytes()
        .to_vec()
}

/// Extract the JSON payloads of all `data:` frames from an SSE body
async fn sse_events(body: Body) -> Vec<Value> {
    let bytes = body_bytes(body).await;
    let text = String::from_utf8(bytes).expect("utf-8 SSE body");
    text.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim_start()).expect("parse event JSON"))
        .collect()
}

// A 1x1 transparent PNG is overkill here; any bytes work for storage tests
const SAMPLE_BASE64: &str = "iVBORw0KGgo="; // valid base64

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "greenrack-catalog");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_image_and_rule_round_trip() {
    let (app, _) = setup_app().await;

    // Create an image
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/repository/images",
            json!({
                "name": "Acme Gummies",
                "base64Image": SAMPLE_BASE64,
                "fileName": "gummies.png",
                "mimeType": "image/png",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response.into_body()).await;
    let image_id = created["id"].as_i64().unwrap();
    assert_eq!(created["rulesCount"], 0);

    // Listed with zero rules
    let response = app.clone().oneshot(get("/api/repository/images")).await.unwrap();
    let images = body_json(response.into_body()).await;
    assert_eq!(images.as_array().unwrap().len(), 1);
    assert_eq!(images[0]["rulesCount"], 0);

    // Attach a rule
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/repository/rules",
            json!({"imageId": image_id, "brandName": "Acme"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rule = body_json(response.into_body()).await;
    assert_eq!(rule["imageId"], image_id);
    assert_eq!(rule["brandName"], "Acme");
    assert_eq!(rule["priority"], 1);

    // Rule shows up nested under the image
    let response = app.clone().oneshot(get("/api/repository/images")).await.unwrap();
    let images = body_json(response.into_body()).await;
    assert_eq!(images[0]["rulesCount"], 1);
    assert_eq!(images[0]["rules"][0]["brandName"], "Acme");
}

#[tokio::test]
async fn test_create_image_missing_fields_rejected() {
    let (app, _) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/repository/images",
            json!({
                "name": "",
                "base64Image": SAMPLE_BASE64,
                "fileName": "x.png",
                "mimeType": "image/png",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_get_image_bytes() {
    let (app, _) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/repository/images",
            json!({
                "name": "bytes",
                "base64Image": SAMPLE_BASE64,
                "fileName": "b.png",
                "mimeType": "image/png",
            }),
        ))
        .await
        .unwrap();
    let created = body_json(response.into_body()).await;
    let image_id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/repository/images/{}", image_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );
    let bytes = body_bytes(response.into_body()).await;
    assert!(!bytes.is_empty());

    // Unknown id is a 404
    let response = app
        .oneshot(get("/api/repository/images/99999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_nonexistent_image_and_rule_succeed() {
    let (app, _) = setup_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/repository/images/4242")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["success"], true);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/repository/rules/4242")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_create_rule_against_missing_image_is_not_found() {
    let (app, _) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/repository/rules",
            json!({"imageId": 31337}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_match_endpoint() {
    let (app, _) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/repository/images",
            json!({
                "name": "Acme Default",
                "base64Image": SAMPLE_BASE64,
                "fileName": "acme.png",
                "mimeType": "image/png",
            }),
        ))
        .await
        .unwrap();
    let image_id = body_json(response.into_body()).await["id"].as_i64().unwrap();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/repository/rules",
            json!({"imageId": image_id, "brandName": "Acme"}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/repository/match",
            json!({"products": [
                {"productId": 1, "productName": "Acme Gummies", "brandName": "Acme"},
                {"productId": 2, "productName": "Other Brand Vape", "brandName": "Other"},
            ]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let results = body_json(response.into_body()).await;
    assert_eq!(results.as_array().unwrap().len(), 2);
    assert_eq!(results[0]["productId"], 1);
    assert_eq!(results[0]["matchedImageId"], image_id);
    assert_eq!(results[0]["matchedImageName"], "Acme Default");
    assert_eq!(results[1]["productId"], 2);
    assert_eq!(results[1]["matchedImageId"], Value::Null);
}

#[tokio::test]
async fn test_match_requires_products_array() {
    let (app, _) = setup_app().await;

    let response = app
        .oneshot(json_request("POST", "/api/repository/match", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_apply_rejects_empty_batch() {
    let (app, _) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/repository/apply",
            json!({"items": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request("POST", "/api/repository/apply", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_apply_streams_events_for_missing_images() {
    let (app, _) = setup_app().await;

    // None of these repository images exist, so every item fails before the
    // POS is contacted; the stream still covers the full batch.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/repository/apply",
            json!({"items": [
                {"productId": 1, "imageId": 900, "productName": "A"},
                {"productId": 2, "imageId": 901, "productName": "B"},
                {"productId": 3, "imageId": 902, "productName": "C"},
            ]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let events = sse_events(response.into_body()).await;
    assert_eq!(events.len(), 7);

    for (i, product_id) in [(0usize, 1i64), (2, 2), (4, 3)] {
        assert_eq!(events[i]["type"], "start");
        assert_eq!(events[i]["productId"], product_id);
        assert_eq!(events[i + 1]["type"], "error");
        assert_eq!(
            events[i + 1]["error"],
            format!("Repository image {} not found", 899 + product_id)
        );
    }
    assert_eq!(events[6]["type"], "done");
}

#[tokio::test]
async fn test_upload_batch_rejects_empty_batch() {
    let (app, _) = setup_app().await;

    let response = app
        .oneshot(json_request("POST", "/api/images/upload-batch", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_products_served_from_cache_without_pos() {
    let (app, state) = setup_app().await;

    // Seed the cache; the POS itself is unreachable in this setup, so a
    // cache miss would surface as an upstream error instead.
    let seeded = json!([{"productId": 7, "productName": "Cached", "isActive": true}]);
    state.cache.set(PRODUCTS_ALL_KEY, &seeded, PRODUCTS_TTL);

    let response = app.oneshot(get("/api/products")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body[0]["productId"], 7);
}

#[tokio::test]
async fn test_pos_failure_surfaces_as_bad_gateway() {
    let (app, _) = setup_app().await;

    let response = app.oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_apply_batch_invalidates_product_cache() {
    let (app, state) = setup_app().await;

    state
        .cache
        .set(PRODUCTS_ALL_KEY, &json!([{"productId": 1}]), Duration::from_secs(600));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/repository/apply",
            json!({"items": [{"productId": 1, "imageId": 555}]}),
        ))
        .await
        .unwrap();
    // Drain the stream so the pipeline runs to completion
    let events = sse_events(response.into_body()).await;
    assert_eq!(events.last().unwrap()["type"], "done");

    assert_eq!(state.cache.get::<Value>(PRODUCTS_ALL_KEY), None);
}
