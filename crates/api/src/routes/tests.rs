//! Router tests over the in-memory repository.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::app;
use crate::config::ApiConfig;
use crate::db::MemoryRepository;
use crate::middleware::REQUEST_ID_HEADER;
use crate::state::AppState;

fn test_app() -> Router {
    let config = ApiConfig::from_lookup(|key| match key {
        "STOREKEEP_STORAGE" => Some("memory".to_string()),
        "SERVICE_NAME" => Some("storekeep-test".to_string()),
        _ => None,
    })
    .unwrap();
    app(AppState::new(config, MemoryRepository::new()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_user(app: &Router, email: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/usuarios",
        Some(json!({"name": "Ana", "email": email, "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn create_store(app: &Router, user_id: &Value) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/stores",
        Some(json!({"name": "Corner", "userId": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

// =============================================================================
// Service
// =============================================================================

#[tokio::test]
async fn test_root_and_status() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "service": "storekeep-test"}));

    let (status, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "API Online"}));
}

#[tokio::test]
async fn test_readiness_with_memory_backend() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/status")
                .header(REQUEST_ID_HEADER, "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-123");

    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_create_user_then_duplicate_email_conflicts() {
    let app = test_app();

    let user = create_user(&app, "ana@example.com").await;
    assert!(user["id"].is_number());
    assert_eq!(user["name"], "Ana");
    assert_eq!(user["email"], "ana@example.com");
    assert_eq!(user["password"], "secret");

    let (status, body) = send(
        &app,
        Method::POST,
        "/usuarios",
        Some(json!({"name": "Other", "email": "ana@example.com", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": "email already registered"}));
}

#[tokio::test]
async fn test_create_user_missing_field_is_server_error() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/usuarios",
        Some(json!({"name": "Ana"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "failed to create user"}));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/usuarios")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_user_wrong_shape_is_server_error() {
    let app = test_app();
    for body in [
        json!({"name": 123, "email": "a@example.com", "password": "p"}),
        json!([]),
    ] {
        let (status, response) = send(&app, Method::POST, "/usuarios", Some(body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response, json!({"error": "failed to create user"}));
    }

    let (status, users) = send(&app, Method::GET, "/usuarios", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users, json!([]));
}

#[tokio::test]
async fn test_list_users_in_ascending_id_order() {
    let app = test_app();
    for email in ["c@example.com", "a@example.com", "b@example.com"] {
        create_user(&app, email).await;
    }

    let (status, body) = send(&app, Method::GET, "/usuarios", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_get_user_missing_and_malformed() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/usuarios/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "user not found"}));

    let (status, body) = send(&app, Method::GET, "/usuarios/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_partial_update_skips_absent_and_empty_fields() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    let uri = format!("/usuarios/{}", user["id"]);

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"name": "X"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "X");
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["password"], "secret");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "X");
}

#[tokio::test]
async fn test_update_needs_a_json_body() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    let uri = format!("/usuarios/{}", user["id"]);

    let (status, body) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, user);
}

#[tokio::test]
async fn test_update_user_errors() {
    let app = test_app();
    create_user(&app, "a@example.com").await;
    let b = create_user(&app, "b@example.com").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/usuarios/999",
        Some(json!({"name": "Ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/usuarios/{}", b["id"]),
        Some(json!({"email": "a@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_user() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    let uri = format!("/usuarios/{}", user["id"]);

    let (status, body) = send(&app, Method::DELETE, "/usuarios/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "user not found"}));

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_owning_a_store_is_rejected() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    create_store(&app, &user["id"]).await;
    let uri = format!("/usuarios/{}", user["id"]);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Stores
// =============================================================================

#[tokio::test]
async fn test_second_store_for_user_is_rejected() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    let first = create_store(&app, &user["id"]).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/stores",
        Some(json!({"name": "Second", "userId": user["id"].to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "user already has a store"}));

    let (status, _) = send(&app, Method::GET, "/stores/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(first["id"], 1);
}

#[tokio::test]
async fn test_store_for_unknown_user_is_bad_request() {
    let app = test_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/stores",
        Some(json!({"name": "Ghost", "userId": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/stores",
        Some(json!({"name": "Ghost", "userId": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_store_expands_owner_and_products() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    let store = create_store(&app, &user["id"]).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"name": "Mug", "price": "4.50", "storeId": store["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, &format!("/stores/{}", store["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Corner");
    assert_eq!(body["userId"], user["id"]);
    assert_eq!(body["user"], user);
    assert_eq!(body["products"][0]["name"], "Mug");
    assert_eq!(body["products"][0]["price"], "4.50");

    let (status, _) = send(&app, Method::GET, "/stores/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_and_delete_store() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    let store = create_store(&app, &user["id"]).await;
    let uri = format!("/stores/{}", store["id"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"name": "Renamed", "userId": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["userId"], user["id"]);

    let (status, _) = send(&app, Method::PUT, "/stores/99", Some(json!({"name": "X"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_price_round_trips_exactly() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    let store = create_store(&app, &user["id"]).await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"name": "Mug", "price": "19.99", "storeId": store["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["price"], "19.99");
    assert_eq!(created["storeId"], store["id"]);

    let (_, from_number) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"name": "Cup", "price": 19.99, "storeId": store["id"]})),
    )
    .await;
    assert_eq!(from_number["price"], "19.99");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/products/{}", created["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], "19.99");
}

#[tokio::test]
async fn test_product_detail_nests_store_owner() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    let store = create_store(&app, &user["id"]).await;
    let (_, product) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"name": "Mug", "price": "4.50", "storeId": store["id"]})),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/products/{}", product["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"]["id"], store["id"]);
    assert_eq!(body["store"]["user"], user);

    let (status, list) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["store"]["user"]["email"], "ana@example.com");

    let (status, _) = send(&app, Method::GET, "/products/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_product_failures_are_bad_requests() {
    let app = test_app();
    let cases = [
        json!({"name": "Mug", "price": "4.50", "storeId": 1}),
        json!({"name": "Mug", "storeId": 1}),
        json!({"name": "Mug", "price": "cheap", "storeId": 1}),
    ];

    for case in cases {
        let (status, body) = send(&app, Method::POST, "/products", Some(case)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_update_product_applies_zero_price() {
    let app = test_app();
    let user = create_user(&app, "ana@example.com").await;
    let store = create_store(&app, &user["id"]).await;
    let (_, product) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"name": "Mug", "price": "4.50", "storeId": store["id"]})),
    )
    .await;
    let uri = format!("/products/{}", product["id"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"name": "", "price": 0, "storeId": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Mug");
    assert_eq!(body["price"], "0");
    assert_eq!(body["storeId"], store["id"]);

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"storeId": 999}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
