//! Exploitability-vs-time scatter handler

use axum::{extract::State, Json};

use crate::logic::{aggregate, corpus};
use crate::models::ScatterPoint;
use crate::{AppResult, AppState};

/// Scatter view: one point per record carrying both a published date
/// and an exploitability score
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ScatterPoint>>> {
    let raw = corpus::load(&state.http, &state.config).await?;
    let records = corpus::flatten(&raw);
    Ok(Json(aggregate::scatter_points(&records)))
}
