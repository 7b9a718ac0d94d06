//! Checkout session route tests.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::json;

use alyssa_loops_integration_tests::{RecordingMailer, StubGateway, TestApp};

#[tokio::test]
async fn test_empty_cart_is_rejected_without_provider_call() {
    let app = TestApp::default();

    for body in [json!({}), json!({ "cart": {} }), json!({ "cart": null })] {
        let response = app.post_json("/api/create-checkout-session", &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json(), json!({ "ok": false, "error": "Cart empty" }));
    }

    assert!(app.gateway.requests().is_empty());
}

#[tokio::test]
async fn test_creates_session_and_returns_url() {
    let app = TestApp::default();
    let response = app
        .post_json(
            "/api/create-checkout-session",
            &json!({
                "cart": {
                    "Crochet Bunny": { "name": "Crochet Bunny", "price": 25, "qty": 2 },
                    "Mini Bee": { "name": "Mini Bee", "price": 7.5 }
                }
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "ok": true, "url": "https://checkout.stripe.com/c/pay/cs_test_1" })
    );

    let requests = app.gateway.requests();
    assert_eq!(requests.len(), 1);
    let params = &requests[0];

    let bunny = &params.line_items[0];
    assert_eq!(bunny.name, "Crochet Bunny");
    assert_eq!(bunny.unit_amount, 2500);
    assert_eq!(bunny.quantity, 2);

    // Missing quantity means one unit
    let bee = &params.line_items[1];
    assert_eq!(bee.unit_amount, 750);
    assert_eq!(bee.quantity, 1);

    assert_eq!(params.currency, "usd");
    assert_eq!(params.shipping_countries, vec!["US".to_string()]);
    assert_eq!(
        params.success_url,
        "https://alyssaloops.com/success.html?session_id={CHECKOUT_SESSION_ID}"
    );
    assert_eq!(params.cancel_url, "https://alyssaloops.com/cancel.html");

    let echoed: serde_json::Value = serde_json::from_str(&params.cart_json).unwrap();
    assert_eq!(echoed["Crochet Bunny"]["qty"], 2);
}

#[tokio::test]
async fn test_provider_failure_is_server_error() {
    let app = TestApp::new(RecordingMailer::default(), StubGateway::failing());
    let response = app
        .post_json(
            "/api/create-checkout-session",
            &json!({ "cart": { "Bee": { "name": "Bee", "price": 7, "qty": 1 } } }),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["ok"], false);
    // Provider details stay on the server
    assert!(!response.text().contains("sk_test"));
}

#[tokio::test]
async fn test_session_without_url_is_server_error() {
    let app = TestApp::new(RecordingMailer::default(), StubGateway::without_url());
    let response = app
        .post_json(
            "/api/create-checkout-session",
            &json!({ "cart": { "Bee": { "name": "Bee", "price": 7, "qty": 1 } } }),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.gateway.requests().len(), 1);
}

#[tokio::test]
async fn test_negative_price_is_rejected() {
    let app = TestApp::default();
    let response = app
        .post_json(
            "/api/create-checkout-session",
            &json!({ "cart": { "Bee": { "name": "Bee", "price": -7, "qty": 1 } } }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.gateway.requests().is_empty());
}
