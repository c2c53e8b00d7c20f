#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use cpm_engine::{Activity, Project, http_api};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(Project::new());
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn activity_lifecycle_via_http_api() {
    let app = new_router();
    let activity = Activity::new(1, "HTTP Demo", 5);

    // Create activity
    let response = app
        .clone()
        .oneshot(json_request("POST", "/activities", &json!(activity)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Creating it twice conflicts
    let response = app
        .clone()
        .oneshot(json_request("POST", "/activities", &json!(activity)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Fetch created activity
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/activities/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Activity = serde_json::from_value(read_json(response).await).unwrap();
    assert_eq!(fetched, activity);

    // Update with a mismatched id
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/activities/1",
            &json!(Activity::new(2, "Wrong", 1)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Delete the activity
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/activities/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/activities/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_duration_is_a_bad_request() {
    let app = new_router();
    let response = app
        .oneshot(json_request(
            "POST",
            "/activities",
            &json!({"id": 1, "name": "Nothing", "duration": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");
    assert!(body["message"].as_str().unwrap().contains("non-positive duration"));
}

#[tokio::test]
async fn stored_project_schedule_reports_critical_path() {
    let app = new_router();
    for activity in [
        json!({"id": 1, "name": "A", "duration": 2}),
        json!({"id": 2, "name": "B", "duration": 3, "dependencies": [1]}),
        json!({"id": 3, "name": "C", "duration": 1, "dependencies": [1]}),
        json!({"id": 4, "name": "D", "duration": 2, "dependencies": [2, 3]}),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/activities", &activity))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(empty_request("GET", "/schedule"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["summary"]["project_duration"], 7);
    assert_eq!(body["critical_path"], json!(["A", "B", "D"]));
    assert_eq!(body["summary"]["critical_path"], json!([1, 2, 4]));
    assert_eq!(body["schedule"]["entries"]["3"]["slack"], 2);
}

#[tokio::test]
async fn compute_endpoint_reports_cycles() {
    let app = new_router();
    let payload = json!({
        "activities": [
            {"id": 1, "name": "A", "duration": 1, "dependencies": [2]},
            {"id": 2, "name": "B", "duration": 1, "dependencies": [1]}
        ]
    });
    let response = app
        .oneshot(json_request("POST", "/compute", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["error"], "dependency_cycle");
    assert_eq!(body["unresolved"], json!([1, 2]));
}

#[tokio::test]
async fn metadata_can_be_replaced() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/metadata",
            &json!({"project_name": "Bridge"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("GET", "/metadata"))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["project_name"], "Bridge");
    assert_eq!(body["project_description"], "No description");
}
