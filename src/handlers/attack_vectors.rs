//! Attack-vector distribution handler

use axum::{extract::State, Json};

use crate::logic::{aggregate, corpus};
use crate::models::AttackVectorCount;
use crate::{AppResult, AppState};

/// Pie-chart view: record count per attack vector
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<AttackVectorCount>>> {
    let raw = corpus::load(&state.http, &state.config).await?;
    let records = corpus::flatten(&raw);
    Ok(Json(aggregate::attack_vector_counts(&records)))
}
