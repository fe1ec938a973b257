//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: i64,
    /// Remote feed the loader tries first
    corpus_feed: String,
    /// Whether the local fallback file exists right now
    local_fallback_present: bool,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let local_fallback_present = tokio::fs::try_exists(&state.config.data_path)
        .await
        .unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        service: "threatlens",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        corpus_feed: state.config.feed_url.clone(),
        local_fallback_present,
    })
}
