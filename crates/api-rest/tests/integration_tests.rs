//! Integration tests for REST API
//!
//! Drives the full router (middleware included) with `oneshot` requests
//! against the in-memory profile store.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use expert_roster_api_rest::{build_router, ApiConfig, AppState};
use expert_roster_testing::{builders::*, fixtures::*};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    let config = ApiConfig {
        enable_swagger: false,
        ..ApiConfig::default()
    };
    build_router(AppState::in_memory(), &config)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> Value {
    let submission = SubmissionBuilder::new().with_email(email).build();
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/experts",
        Some(serde_json::to_value(submission).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ready"], true);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_register_and_fetch_expert() {
    // Arrange
    let app = test_app();
    let created = register(&app, "ada@example.com").await;
    let id = created["id"].as_str().unwrap();

    // Act
    let (status, body) = send(&app, Method::GET, &format!("/api/v1/experts/{}", id), None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let profile = &body["data"];
    assert_eq!(profile["email"], "ada@example.com");
    assert_eq!(profile["reviewStatus"], "pending");
    assert_eq!(profile["isVerified"], false);
    assert_eq!(profile["references"].as_array().unwrap().len(), 2);
    assert_eq!(profile["skills"][0]["endorsements"], 0);
    assert_eq!(profile["references"][0]["profileId"], id);
}

#[tokio::test]
async fn test_register_sets_location_header() {
    let app = test_app();
    let submission = SubmissionBuilder::new().with_email("located@example.com").build();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/experts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&submission).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        location,
        format!("/api/v1/experts/{}", body["data"]["id"].as_str().unwrap())
    );
}

#[tokio::test]
async fn test_register_concrete_scenario() {
    let app = test_app();
    let submission = concrete_scenario_submission();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/experts",
        Some(serde_json::to_value(&submission).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let profile = &body["data"];
    assert_eq!(profile["fullName"], "Ab");
    assert_eq!(profile["experiences"][0]["current"], true);
    assert!(profile["experiences"][0].get("endDate").is_none());
    assert_eq!(profile["certifications"], json!([]));
}

#[tokio::test]
async fn test_register_validation_error_has_field_details() {
    let app = test_app();
    let submission = SubmissionBuilder::new()
        .with_bio("too short")
        .with_reference_count(1)
        .build();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/experts",
        Some(serde_json::to_value(submission).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(
        body["details"]["personalInfo.bio"][0],
        "Bio must be at least 100 characters"
    );
    assert_eq!(
        body["details"]["references"][0],
        "At least two references are required"
    );
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_register_blank_date_and_level_are_field_errors() {
    let app = test_app();
    let mut body = serde_json::to_value(SubmissionBuilder::new().build()).unwrap();
    body["expertise"]["experiences"][0]["startDate"] = json!("");
    body["expertise"]["skills"][0]["level"] = json!("");

    let (status, body) = send(&app, Method::POST, "/api/v1/experts", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(
        body["details"]["expertise.experiences.0.startDate"][0],
        "Start date is required"
    );
    assert_eq!(body["details"]["expertise.skills.0.level"][0], "Level is required");
}

#[tokio::test]
async fn test_unparseable_body_uses_error_envelope() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/experts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "BAD_REQUEST");
    assert!(body["request_id"].is_string());

    let mut unknown = serde_json::to_value(SubmissionBuilder::new().build()).unwrap();
    unknown["expertise"]["skills"][0]["level"] = json!("Guru");
    let (status, body) = send(&app, Method::POST, "/api/v1/experts", Some(unknown)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_review_with_unknown_status_uses_error_envelope() {
    let app = test_app();
    let created = register(&app, "status@example.com").await;
    let uri = format!("/api/v1/experts/{}/review", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "status": "maybe" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = test_app();
    register(&app, "grace@example.com").await;

    let duplicate = SubmissionBuilder::new().with_email("GRACE@example.com").build();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/experts",
        Some(serde_json::to_value(duplicate).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DUPLICATE_EMAIL");
    assert_eq!(body["message"], "An account with this email already exists");
}

#[tokio::test]
async fn test_validate_step() {
    let app = test_app();
    let draft = SubmissionBuilder::new().with_bio("short").build();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/experts/validate",
        Some(json!({ "step": 2, "submission": draft })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nextStep"], 3);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/experts/validate",
        Some(json!({ "step": 1, "submission": draft })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"].as_object().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/experts/validate",
        Some(json!({ "step": 7, "submission": draft })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_experts_with_search() {
    let app = test_app();
    register(&app, "first@example.com").await;
    register(&app, "second@example.com").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/experts?per_page=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["has_next"], true);

    let (_, body) = send(&app, Method::GET, "/api/v1/experts?search=SECOND", None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"][0]["email"], "second@example.com");
}

#[tokio::test]
async fn test_list_rejects_oversized_page() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/v1/experts?per_page=500", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_replace_relation() {
    let app = test_app();
    let created = register(&app, "replace@example.com").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/experts/{}/relations/skills", id),
        Some(json!([
            { "name": "Biostatistics", "category": "Technical", "level": "Advanced", "endorsements": 9 }
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let skills = body["data"]["skills"].as_array().unwrap();
    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0]["name"], "Biostatistics");
    assert_eq!(skills[0]["endorsements"], 0);
    assert_eq!(body["data"]["references"], created["references"]);
}

#[tokio::test]
async fn test_replace_relation_rejects_unknown_relation_and_short_lists() {
    let app = test_app();
    let created = register(&app, "short@example.com").await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/experts/{}/relations/hobbies", id),
        Some(json!([])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/experts/{}/relations/references", id),
        Some(json!([serde_json::to_value(reference()).unwrap()])),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["references"][0], "At least two references are required");
}

#[tokio::test]
async fn test_update_details_and_review() {
    let app = test_app();
    let created = register(&app, "details@example.com").await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/experts/{}", id);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "fullName": "Dr. Details", "email": "details@example.org" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullName"], "Dr. Details");
    assert_eq!(body["data"]["bio"], created["bio"]);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "fullName": "", "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_FAILED");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{}/review", uri),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reviewStatus"], "approved");
    assert_eq!(body["data"]["isVerified"], true);
}

#[tokio::test]
async fn test_full_update() {
    let app = test_app();
    let created = register(&app, "full@example.com").await;
    let id = created["id"].as_str().unwrap();

    let edited = SubmissionBuilder::new()
        .with_email("full@example.com")
        .with_full_name("Edited Name")
        .with_reference_count(3)
        .build();
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/experts/{}", id),
        Some(serde_json::to_value(edited).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["fullName"], "Edited Name");
    assert_eq!(body["data"]["references"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_delete_expert() {
    let app = test_app();
    let created = register(&app, "delete@example.com").await;
    let uri = format!("/api/v1/experts/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Expert not found");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/v1/experts/not-a-uuid", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}
