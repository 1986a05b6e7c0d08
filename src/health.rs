//! Health-check HTTP endpoint.
//!
//! A single JSON route for container platforms to probe. Runs on its
//! own task, fully independent of message processing.

use crate::config::Features;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared snapshot served by the endpoint.
pub struct HealthState {
    /// Process start time
    pub started_at: Instant,
    /// Effective feature switches
    pub features: Features,
}

async fn health(State(state): State<Arc<HealthState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "bot": "Aria Mini",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "timestamp": Utc::now().to_rfc3339(),
        "features": {
            "ai": state.features.enable_ai,
            "downloads": state.features.enable_downloads,
            "apk_downloads": state.features.enable_apk_downloads,
            "customer_care": state.features.enable_customer_care,
            "rate_limiting": state.features.enable_rate_limiting,
        },
    }))
}

/// Binds and serves the health route until the process exits.
///
/// # Errors
///
/// Returns an error if the port cannot be bound.
pub async fn serve(port: u16, state: Arc<HealthState>) -> anyhow::Result<()> {
    let app = Router::new().route("/", get(health)).with_state(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "health check server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
