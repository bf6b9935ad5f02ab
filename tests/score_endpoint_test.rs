//! Integration tests for the scoring endpoint
//!
//! Drives the full router with in-process requests: stub scorer, stub
//! retriever, real axum extraction and error mapping.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use themis_core::{ApiServer, ApiServerConfig, Evaluator, StubRetriever, StubScorer};
use tower::ServiceExt;

fn test_router() -> Router {
    let evaluator = Arc::new(Evaluator::new(
        Arc::new(StubScorer::new()),
        Arc::new(StubRetriever::new()),
        3,
    ));
    ApiServer::new(ApiServerConfig::default(), evaluator).router()
}

fn score_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/score")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_score_returns_banded_result() {
    let router = test_router();

    let response = router
        .oneshot(score_request(json!({
            "project_name": "Invoice OCR",
            "project_text": "Automate invoice matching with OCR across all business units",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;

    let metrics = body["metrics"].as_array().unwrap();
    assert_eq!(metrics.len(), 3);
    assert_eq!(metrics[0]["metric"], "impact");
    assert_eq!(metrics[1]["metric"], "effort");
    assert_eq!(metrics[2]["metric"], "risk");
    assert_eq!(metrics[0]["submetrics"].as_array().unwrap().len(), 3);
    assert_eq!(metrics[2]["submetrics"].as_array().unwrap().len(), 4);

    // Each metric mean is the mean of its sub-metric scores, and the overall
    // score is the mean of the three metric means
    for metric in metrics {
        let submetrics = metric["submetrics"].as_array().unwrap();
        let mean: f64 = submetrics
            .iter()
            .map(|s| s["score"].as_f64().unwrap())
            .sum::<f64>()
            / submetrics.len() as f64;
        assert_eq!(metric["mean"].as_f64().unwrap(), mean);
    }

    let mean_of_means: f64 = metrics
        .iter()
        .map(|m| m["mean"].as_f64().unwrap())
        .sum::<f64>()
        / 3.0;
    assert_eq!(body["overall_score"].as_f64().unwrap(), mean_of_means);

    // Stub scores are mid-band by construction
    assert_eq!(body["band"], "medium");
}

#[tokio::test]
async fn test_identical_requests_are_byte_identical() {
    let router = test_router();
    let body = json!({
        "project_text": "Migrate the reporting stack to a lakehouse architecture",
    });

    let first = router
        .clone()
        .oneshot(score_request(body.clone()))
        .await
        .unwrap();
    let second = router.oneshot(score_request(body)).await.unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let first_bytes = to_bytes(first.into_body(), usize::MAX).await.unwrap();
    let second_bytes = to_bytes(second.into_body(), usize::MAX).await.unwrap();
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn test_missing_project_text_is_422() {
    let router = test_router();

    let response = router
        .oneshot(score_request(json!({ "project_name": "No text" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_empty_project_text_is_422_with_field_detail() {
    let router = test_router();

    let response = router
        .oneshot(score_request(json!({ "project_text": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["detail"].as_str().unwrap().contains("project_text"));
}

#[tokio::test]
async fn test_unknown_submetric_is_500() {
    let router = test_router();

    let response = router
        .oneshot(score_request(json!({
            "project_text": "Some project",
            "submetrics": ["market_size"],
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_submetric");
}

#[tokio::test]
async fn test_selection_leaving_a_metric_empty_is_500() {
    let router = test_router();

    let response = router
        .oneshot(score_request(json!({
            "project_text": "Some project",
            "submetrics": ["strategic_fit"],
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "empty_metric_definition");
}

#[tokio::test]
async fn test_health_reports_selected_backends() {
    let router = test_router();

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["scorer"], "stub");
    assert_eq!(body["retriever"], "stub");
}
