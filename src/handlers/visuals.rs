//! Combined dashboard handler

use axum::{extract::State, Json};

use crate::logic::{aggregate, corpus, pipeline};
use crate::models::Visuals;
use crate::{AppResult, AppState};

/// All four views bundled in one response; the corpus is loaded once
/// and shared across them
pub async fn get(State(state): State<AppState>) -> AppResult<Json<Visuals>> {
    let raw = corpus::load(&state.http, &state.config).await?;
    let records = corpus::flatten(&raw);

    let pie = aggregate::attack_vector_counts(&records);
    let scatter = aggregate::scatter_points(&records);
    let sankey = aggregate::sankey(&records);

    let config = state.config.clone();
    let tsne =
        tokio::task::spawn_blocking(move || pipeline::cluster_view(&records, &config)).await??;

    Ok(Json(Visuals {
        pie,
        scatter,
        sankey: sankey.into(),
        tsne,
    }))
}
