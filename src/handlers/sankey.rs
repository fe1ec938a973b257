//! Source→tactic→platform Sankey handler

use axum::{extract::State, Json};

use crate::logic::{aggregate, corpus};
use crate::models::SankeyGraph;
use crate::{AppResult, AppState};

/// Flow-graph view over source, category, and platform nodes
pub async fn get(State(state): State<AppState>) -> AppResult<Json<SankeyGraph>> {
    let raw = corpus::load(&state.http, &state.config).await?;
    let records = corpus::flatten(&raw);
    Ok(Json(aggregate::sankey(&records)))
}
