//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                 - Healthcheck with service name
//! GET    /status           - Static status message
//! GET    /health           - Liveness
//! GET    /health/ready     - Readiness (repository ping)
//!
//! # Users
//! POST   /usuarios         - Create user
//! GET    /usuarios         - List users
//! GET    /usuarios/{id}    - Get user
//! PUT    /usuarios/{id}    - Update user
//! DELETE /usuarios/{id}    - Delete user
//!
//! # Stores
//! POST   /stores           - Create store
//! GET    /stores/{id}      - Get store with owner and products
//! PUT    /stores/{id}      - Update store
//! DELETE /stores/{id}      - Delete store
//!
//! # Products
//! POST   /products         - Create product
//! GET    /products         - List products with store and owner
//! GET    /products/{id}    - Get product with store and owner
//! PUT    /products/{id}    - Update product
//! DELETE /products/{id}    - Delete product
//! ```

pub mod extract;
pub mod health;
pub mod products;
pub mod stores;
pub mod users;

#[cfg(test)]
mod tests;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create).get(users::index))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new().route("/", post(stores::create)).route(
        "/{id}",
        get(stores::show).put(stores::update).delete(stores::destroy),
    )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::index))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/status", get(health::status))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/usuarios", user_routes())
        .nest("/stores", store_routes())
        .nest("/products", product_routes())
}

/// Build the complete application: routes, request IDs and tracing.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}
