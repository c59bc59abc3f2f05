//! Test helper utilities for timetable-client integration tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::time::Duration;
use timetable_client::{ApiClient, ApiClientBuilder, StaticToken};
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-session-token";

/// A room as returned by the timetable API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: u32,
    pub name: String,
    pub capacity: u32,
}

pub fn sample_room() -> Room {
    Room {
        id: 7,
        name: "Science Lab".to_string(),
        capacity: 28,
    }
}

/// Client pointed at the mock server, without authentication.
pub fn create_test_client(server: &MockServer) -> ApiClient {
    ApiClientBuilder::new()
        .base_url(format!("{}/api", server.uri()))
        .timeout(Duration::from_secs(5))
        .build()
        .expect("test client should build")
}

/// Client pointed at the mock server that sends [`TEST_TOKEN`].
pub fn create_authenticated_client(server: &MockServer) -> ApiClient {
    ApiClientBuilder::new()
        .base_url(format!("{}/api", server.uri()))
        .timeout(Duration::from_secs(5))
        .token_provider(StaticToken::new(TEST_TOKEN))
        .build()
        .expect("test client should build")
}

/// Client with a short transport timeout, for timeout scenarios.
pub fn create_impatient_client(server: &MockServer, timeout: Duration) -> ApiClient {
    ApiClientBuilder::new()
        .base_url(format!("{}/api", server.uri()))
        .timeout(timeout)
        .build()
        .expect("test client should build")
}

/// Base URL of a local port with nothing listening on it.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api")
}
