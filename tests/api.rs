use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use stablecoin_arbitrage::{
    api::{router, AppState},
    arbitrage::SpreadDetector,
    config::Config,
    providers::{PriceProvider, ProviderManager},
};
use std::sync::Arc;
use tower::ServiceExt;

struct FixedProvider(&'static str, Option<f64>);

#[async_trait]
impl PriceProvider for FixedProvider {
    fn name(&self) -> &str {
        self.0
    }

    async fn fetch_price(&self) -> Result<f64> {
        self.1.ok_or_else(|| anyhow!("connection refused"))
    }
}

fn test_app(binance: Option<f64>, coinbase: Option<f64>, demo: bool) -> Router {
    let mut config = Config::default();
    config.api.demo_opportunities = demo;

    let mut manager = ProviderManager::new();
    manager.add_provider(Box::new(FixedProvider("binance", binance))).unwrap();
    manager.add_provider(Box::new(FixedProvider("coinbase", coinbase))).unwrap();

    let detector = SpreadDetector::new(&config.detection).unwrap();
    router(Arc::new(AppState::new(manager, detector, config.api.clone())))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn opportunities_lists_detection_first() {
    let app = test_app(Some(0.9997), Some(1.002), true);

    let response = app.oneshot(get("/opportunities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));

    let opportunities = body["opportunities"].as_array().unwrap();
    assert_eq!(opportunities.len(), 3);

    let detected = &opportunities[0];
    assert!(detected["id"].as_str().unwrap().starts_with("real_opp_"));
    assert_eq!(detected["buyExchange"], json!("binance"));
    assert_eq!(detected["sellExchange"], json!("coinbase"));
    assert_eq!(detected["confidence"], json!(95.0));
    assert_eq!(opportunities[1]["id"], json!("mock_opp_1"));
    assert_eq!(opportunities[2]["id"], json!("mock_opp_2"));
}

#[tokio::test]
async fn opportunities_without_demo_or_detection_is_empty() {
    let app = test_app(Some(1.0), None, false);

    let response = app.oneshot(get("/opportunities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["opportunities"], json!([]));
}

#[tokio::test]
async fn simulate_scales_profit_with_amount() {
    let app = test_app(Some(1.0), Some(1.0), true);

    let response = app
        .oneshot(post_json("/simulate", r#"{"suggestionId": "mock_opp_1", "amount": 2000}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    let simulation = &body["simulation"];
    assert!((simulation["estimatedProfit"].as_f64().unwrap() - 5.0).abs() < 1e-9);
    assert!((simulation["netProfit"].as_f64().unwrap() - 4.2).abs() < 1e-9);
    assert!((simulation["gasEstimate"].as_f64().unwrap() - 0.4).abs() < 1e-9);
    assert_eq!(simulation["message"], json!("Trade simulated successfully."));
}

#[tokio::test]
async fn simulate_defaults_amount() {
    let app = test_app(Some(1.0), Some(1.0), true);

    let response = app
        .oneshot(post_json("/simulate", r#"{"suggestionId": "real_opp_1"}"#))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!((body["simulation"]["estimatedProfit"].as_f64().unwrap() - 2.5).abs() < 1e-9);
}

#[tokio::test]
async fn simulate_failure_envelope() {
    let app = test_app(Some(1.0), Some(1.0), true);

    let response = app
        .clone()
        .oneshot(post_json("/simulate", "not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("Invalid request body"));

    let response = app
        .oneshot(post_json("/simulate", r#"{"amount": -5}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn simulate_null_amount_is_rejected() {
    let app = test_app(Some(1.0), Some(1.0), true);

    let response = app
        .oneshot(post_json("/simulate", r#"{"suggestionId": "mock_opp_1", "amount": null}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("amount must be a number"));
}
