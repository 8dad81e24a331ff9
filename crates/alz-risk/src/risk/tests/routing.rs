use super::common::*;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::risk::router::prediction_router;

fn json_body(raw: &crate::risk::coercion::RawInputRecord) -> String {
    let object: serde_json::Map<String, Value> = raw
        .names()
        .map(|name| {
            let value = raw.get(name).unwrap_or_default().to_string();
            (name.to_string(), Value::String(value))
        })
        .collect();
    Value::Object(object).to_string()
}

fn form_body(raw: &crate::risk::coercion::RawInputRecord) -> String {
    raw.names()
        .map(|name| format!("{}={}", name, raw.get(name).unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("&")
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn json_route_returns_assessment() {
    let router = prediction_router(stub_pipeline(0.75));
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/risk/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json_body(&sample_raw())))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("route responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["tier"], "high");
    assert_eq!(body["probability"], 0.75);
    assert!(body["message"]
        .as_str()
        .expect("message string")
        .contains("75.0%"));
    assert!(body["composite_scores"]["health_score"].is_number());
}

#[tokio::test]
async fn form_route_accepts_urlencoded_fields() {
    let router = prediction_router(stub_pipeline(0.5));
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_body(&sample_raw())))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("route responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["tier"], "moderate");
}

#[tokio::test]
async fn missing_field_is_a_client_error() {
    let mut raw = sample_raw();
    raw.remove("Age");
    let router = prediction_router(stub_pipeline(0.75));
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/risk/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json_body(&raw)))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("route responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error string")
        .contains("missing fields: Age"));
}

#[tokio::test]
async fn classifier_failure_hides_details() {
    let router = prediction_router(pipeline_with(FailingClassifier));
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/risk/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json_body(&sample_raw())))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("route responds");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["error"], "prediction failed");
}
