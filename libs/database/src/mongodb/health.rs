//! Liveness probe against an established connection.

use mongodb::bson::doc;
use mongodb::Client;
use std::time::Instant;

/// Outcome of a [`probe`]: either the ping round-trip time or the error
/// the server (or the driver) produced.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Error detail when unhealthy
    pub message: Option<String>,
    pub response_time_ms: u64,
}

/// Ping the server and report the outcome with timing.
pub async fn probe(client: &Client) -> HealthStatus {
    let start = Instant::now();
    let outcome = client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    HealthStatus {
        healthy: outcome.is_ok(),
        message: outcome.err().map(|e| e.to_string()),
        response_time_ms,
    }
}
