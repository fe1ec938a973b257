//! Clustering pipeline
//!
//! The flatten/label contract: filter records usable for text
//! clustering, vectorize their descriptions, partition with seeded
//! k-means, name each cluster from the configured label table, and
//! project to 2D with seeded t-SNE. Either the whole view succeeds or
//! it reports one specific error kind.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::logic::{kmeans, tsne, vectorizer};
use crate::models::{ClusterPoint, ClusterScore, ThreatRecord};

/// Produce the clustering view over the flattened records
///
/// CPU-bound; server callers should run this under `spawn_blocking`.
pub fn cluster_view(records: &[ThreatRecord], config: &Config) -> AppResult<Vec<ClusterPoint>> {
    // Only records carrying both id and description can be clustered;
    // each skip is a malformed record for this view
    let mut usable: Vec<(String, String, f64)> = Vec::with_capacity(records.len());
    for record in records {
        match (&record.id, &record.description) {
            (Some(id), Some(description)) => usable.push((
                id.clone(),
                description.clone(),
                record.exploitability_score.unwrap_or(0.0),
            )),
            _ => tracing::warn!(
                "Skipping record without id/description in category '{}'",
                record.category
            ),
        }
    }

    if usable.is_empty() {
        return Err(AppError::MalformedRecord(
            "no record has both an id and a description".to_string(),
        ));
    }

    let descriptions: Vec<String> = usable.iter().map(|(_, d, _)| d.clone()).collect();
    let tfidf = vectorizer::fit_transform(&descriptions)?;
    tracing::debug!(
        "Vectorized {} descriptions over a {}-term vocabulary",
        descriptions.len(),
        tfidf.vocabulary.len()
    );
    let assignments = kmeans::kmeans(&tfidf.matrix, config.cluster_count, config.random_seed)?;
    let layout = tsne::tsne(&tfidf.matrix, config.tsne_perplexity, config.random_seed)?;

    let points = usable
        .into_iter()
        .enumerate()
        .map(|(i, (id, description, score))| ClusterPoint {
            x: layout[[i, 0]],
            y: layout[[i, 1]],
            label: config.cluster_label(assignments[i]),
            id,
            description,
            score,
        })
        .collect();

    Ok(points)
}

/// Average exploitability score per cluster, ascending by score
pub fn average_scores(points: &[ClusterPoint]) -> Vec<ClusterScore> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: std::collections::HashMap<&str, (f64, usize)> = std::collections::HashMap::new();

    for point in points {
        if !sums.contains_key(point.label.as_str()) {
            order.push(point.label.clone());
        }
        let entry = sums.entry(point.label.as_str()).or_insert((0.0, 0));
        entry.0 += point.score;
        entry.1 += 1;
    }

    let mut scores: Vec<ClusterScore> = order
        .iter()
        .map(|label| {
            let (sum, count) = sums[label.as_str()];
            ClusterScore {
                label: label.clone(),
                average_score: sum / count as f64,
            }
        })
        .collect();

    scores.sort_by(|a, b| {
        a.average_score
            .partial_cmp(&b.average_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scores
}
