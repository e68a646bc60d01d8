//! HTTP-level tests against the full router: GraphQL, the engine endpoint and
//! health. Requests go through `tower::ServiceExt::oneshot`, no socket needed.

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use feedback_core::domains::feedback::models::Sentiment;
use feedback_core::kernel::test_dependencies::{MockClassifier, TestDependencies};
use feedback_core::server::build_app;
use feedback_core::Config;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(deps: &TestDependencies) -> Router {
    build_app(&Config::default(), deps.server_deps()).expect("Failed to build app")
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn graphql_endpoint_runs_the_workflow() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Mixed));

    let (status, body) = post_json(
        app(&deps),
        "/graphql",
        json!({
            "query": "mutation($input: String!) { submitFeedback(input: $input) { status output } }",
            "variables": { "input": "Good food, rude waiter" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["submitFeedback"]["status"], "SUCCEEDED");
    assert_eq!(
        body["data"]["submitFeedback"]["output"],
        r#"{"Sentiment":"NON-POSITIVE"}"#
    );
    assert_eq!(deps.notifier.notifications()[0].detected_sentiment, "MIXED");
}

#[tokio::test]
async fn graphql_syntax_error_is_bad_request() {
    let deps = TestDependencies::new();
    let (status, body) = post_json(app(&deps), "/graphql", json!({ "query": "mutation {" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_array());
}

#[tokio::test]
async fn engine_endpoint_returns_execution() {
    let deps = TestDependencies::new();
    let config = Config::default();

    let (status, body) = post_json(
        app(&deps),
        "/executions/sync",
        json!({
            "stateMachineArn": config.state_machine_arn,
            "input": json!({ "input": "Great service" }).to_string(),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SUCCEEDED");
    assert!(body["executionArn"]
        .as_str()
        .unwrap()
        .starts_with(&config.state_machine_arn));
}

#[tokio::test]
async fn engine_endpoint_rejects_malformed_input() {
    let deps = TestDependencies::new();

    let (status, body) = post_json(
        app(&deps),
        "/executions/sync",
        json!({ "input": "not a json document" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["__type"], "InvalidExecutionInput");
    assert!(deps.classifier.calls().is_empty());
}

#[tokio::test]
async fn engine_endpoint_rejects_request_without_input() {
    let deps = TestDependencies::new();

    let (status, body) = post_json(
        app(&deps),
        "/executions/sync",
        json!({ "stateMachineArn": "x" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["__type"], "InvalidExecutionInput");
    assert!(body["message"].as_str().unwrap().contains("input"));
    assert!(deps.classifier.calls().is_empty());
}

#[tokio::test]
async fn engine_endpoint_rejects_broken_json() {
    let deps = TestDependencies::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/executions/sync")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"input\": "))
        .unwrap();

    let response = app(&deps).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["__type"], "InvalidExecutionInput");
}

#[tokio::test]
async fn health_reports_memory_store() {
    let deps = TestDependencies::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app(&deps).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
}
