use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports the API version and whether the thread store answers.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut services = HashMap::new();

    let storage = match state.search.list_threads("_health_check").await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            "disconnected"
        }
    };
    services.insert(state.storage.to_string(), storage.to_string());

    Json(HealthResponse {
        status: if storage == "connected" { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
