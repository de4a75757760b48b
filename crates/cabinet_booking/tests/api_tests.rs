
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fixtures::*;
use std::collections::HashMap;
use tower::ServiceExt;

#[tokio::test]
async fn test_checkout_returns_session_ids_and_url() {
    let app = test_app();
    let response = app
        .router
        .oneshot(checkout_request("15/08/2025 14:30", "cabinet"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["sessionId"], "cs_test_1");
    assert_eq!(body["id"], "cs_test_1");
    assert_eq!(body["url"], "https://checkout.test/cs_test_1");
}

#[tokio::test]
async fn test_checkout_rejection_body() {
    let app = test_app();
    let response = app
        .router
        .oneshot(checkout_request("20/08/2025 06:00", "telephone"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "out_of_window");
    assert!(body["message"].as_str().unwrap().contains("07:00"));
    assert_eq!(app.payments.sessions_created(), 0);
}

#[tokio::test]
async fn test_checkout_missing_field_is_invalid_input() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/create-checkout-session")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"serviceType":"visio"}"#))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid_input");
}

#[tokio::test]
async fn test_checkout_unparseable_json_is_invalid_input() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/create-checkout-session")
        .header("content-type", "application/json")
        .body(Body::from("{dateTime:"))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid_input");
}

#[tokio::test]
async fn test_webhook_acknowledges_completed_payment() {
    let app = test_app();
    let metadata = HashMap::from([
        ("dateTime".to_string(), "2025-08-15T14:30".to_string()),
        ("serviceType".to_string(), "cabinet".to_string()),
    ]);

    let response = app
        .router
        .clone()
        .oneshot(webhook_request(
            completed_event("evt_1", "cs_test_1", &metadata),
            Some(VALID_SIGNATURE),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({ "received": true }));
    assert_eq!(app.store.len().await, 1);
    assert_eq!(app.notifier.wait_for(1).await, 1);
}

#[tokio::test]
async fn test_webhook_acknowledges_unrelated_events() {
    let app = test_app();
    let payload = serde_json::json!({
        "id": "evt_2",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_1" } },
    })
    .to_string();

    let response = app
        .router
        .oneshot(webhook_request(payload, Some(VALID_SIGNATURE)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_webhook_acknowledges_malformed_metadata() {
    let app = test_app();
    let metadata = HashMap::from([("dateTime".to_string(), "2025-08-15T14:30".to_string())]);

    let response = app
        .router
        .oneshot(webhook_request(
            completed_event("evt_3", "cs_test_3", &metadata),
            Some(VALID_SIGNATURE),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.is_empty().await);
    assert_eq!(app.notifier.count(), 0);
}

#[tokio::test]
async fn test_webhook_missing_signature_header() {
    let app = test_app();
    let response = app
        .router
        .oneshot(webhook_request(
            completed_event("evt_4", "cs_test_4", &HashMap::new()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "signature_invalid");
}
