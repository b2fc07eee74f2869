//! Integration tests for Storekeep.
//!
//! # Running Tests
//!
//! ```bash
//! # HTTP tests against an in-process server (no database needed)
//! cargo test -p storekeep-integration-tests
//!
//! # PostgreSQL repository tests
//! DATABASE_URL=postgres://localhost/storekeep_test \
//!     cargo test -p storekeep-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `http_api` - Full request/response cycle over TCP
//! - `postgres_repository` - Constraint and decimal behavior against a real database

use std::net::SocketAddr;

use storekeep_api::config::ApiConfig;
use storekeep_api::db::{MemoryRepository, Repository};
use storekeep_api::state::AppState;

/// A running API server bound to an ephemeral local port.
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    /// Start a server backed by a fresh in-memory repository.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        Self::start_with(MemoryRepository::new()).await
    }

    /// Start a server backed by the given repository.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start_with(repo: impl Repository + 'static) -> Self {
        let config = ApiConfig::from_lookup(|key| match key {
            "STOREKEEP_STORAGE" => Some("memory".to_string()),
            "HOST" => Some("127.0.0.1".to_string()),
            "PORT" => Some("0".to_string()),
            _ => None,
        })
        .expect("test configuration is valid");

        let listener = tokio::net::TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener has an address");

        let app = storekeep_api::app(AppState::new(config, repo));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self { addr }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}
