//! Counting and reshaping views over the flattened records
//!
//! These are independent of the clustering pipeline: one pass each,
//! insertion (first-seen) ordering throughout so output is stable for a
//! given corpus.

use std::collections::HashMap;

use crate::models::{AttackVectorCount, SankeyGraph, ScatterPoint, ThreatRecord};

/// Count records per attack vector; missing vectors were already
/// bucketed as "UNKNOWN" at flatten time
pub fn attack_vector_counts(records: &[ThreatRecord]) -> Vec<AttackVectorCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if !counts.contains_key(record.attack_vector.as_str()) {
            order.push(record.attack_vector.clone());
        }
        *counts.entry(record.attack_vector.as_str()).or_insert(0) += 1;
    }

    order
        .iter()
        .map(|vector| AttackVectorCount {
            attack_vector: vector.clone(),
            count: counts[vector.as_str()],
        })
        .collect()
}

/// Extract scatter points; records missing a published date or an
/// exploitability score are skipped, not errors
pub fn scatter_points(records: &[ThreatRecord]) -> Vec<ScatterPoint> {
    records
        .iter()
        .filter_map(|record| {
            let date = record.published_date?;
            let score = record.exploitability_score?;
            Some(ScatterPoint {
                published_date: date.format("%Y-%m-%dT%H:%M:%S").to_string(),
                exploitability_score: score,
                severity: record.category.clone(),
                attack_vector: record.attack_vector.clone(),
            })
        })
        .collect()
}

/// Build the source→category→platform flow graph
///
/// Each record contributes one source→category increment and one
/// category→platform increment per platform entry; duplicate platform
/// entries increment that edge again. Node indices and link order
/// follow first-seen order.
pub fn sankey(records: &[ThreatRecord]) -> SankeyGraph {
    let mut graph = SankeyGraph::default();
    let mut node_index: HashMap<String, usize> = HashMap::new();
    let mut edge_order: Vec<(usize, usize)> = Vec::new();
    let mut edge_counts: HashMap<(usize, usize), usize> = HashMap::new();

    let mut get_index = |name: &str, nodes: &mut Vec<String>| -> usize {
        if let Some(&index) = node_index.get(name) {
            return index;
        }
        let index = nodes.len();
        nodes.push(name.to_string());
        node_index.insert(name.to_string(), index);
        index
    };

    for record in records {
        let source_idx = get_index(&record.source, &mut graph.nodes);
        let category_idx = get_index(&record.category, &mut graph.nodes);

        let edge = (source_idx, category_idx);
        if !edge_counts.contains_key(&edge) {
            edge_order.push(edge);
        }
        *edge_counts.entry(edge).or_insert(0) += 1;

        for platform in &record.platforms {
            let platform_idx = get_index(platform, &mut graph.nodes);
            let edge = (category_idx, platform_idx);
            if !edge_counts.contains_key(&edge) {
                edge_order.push(edge);
            }
            *edge_counts.entry(edge).or_insert(0) += 1;
        }
    }

    for edge in edge_order {
        graph.links.source.push(edge.0);
        graph.links.target.push(edge.1);
        graph.links.value.push(edge_counts[&edge]);
    }

    graph
}
