//! Clustering view handlers
//!
//! The pipeline is CPU-bound, so it runs under `spawn_blocking` to keep
//! the runtime worker threads free for other requests.

use axum::{extract::State, Json};

use crate::logic::{corpus, pipeline};
use crate::models::{ClusterPoint, ClusterScore};
use crate::{AppResult, AppState};

/// Clustered, 2D-projected threat records
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ClusterPoint>>> {
    let raw = corpus::load(&state.http, &state.config).await?;
    let records = corpus::flatten(&raw);

    let config = state.config.clone();
    let points =
        tokio::task::spawn_blocking(move || pipeline::cluster_view(&records, &config)).await??;

    Ok(Json(points))
}

/// Average exploitability score per cluster, ascending
pub async fn averages(State(state): State<AppState>) -> AppResult<Json<Vec<ClusterScore>>> {
    let raw = corpus::load(&state.http, &state.config).await?;
    let records = corpus::flatten(&raw);

    let config = state.config.clone();
    let points =
        tokio::task::spawn_blocking(move || pipeline::cluster_view(&records, &config)).await??;

    Ok(Json(pipeline::average_scores(&points)))
}
