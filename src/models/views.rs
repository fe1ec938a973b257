//! Response records for the derived views
//!
//! Field names are renamed to match the wire format the existing
//! front-end already consumes.

use serde::Serialize;

/// One slice of the attack-vector pie
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttackVectorCount {
    #[serde(rename = "Attack Vector")]
    pub attack_vector: String,
    #[serde(rename = "Count")]
    pub count: usize,
}

/// One exploitability-vs-time scatter point
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScatterPoint {
    #[serde(rename = "Published Date")]
    pub published_date: String,
    #[serde(rename = "Exploitability Score")]
    pub exploitability_score: f64,
    #[serde(rename = "Severity")]
    pub severity: String,
    #[serde(rename = "Attack Vector")]
    pub attack_vector: String,
}

/// Parallel-array link encoding used by the Sankey renderer
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SankeyLinks {
    pub source: Vec<usize>,
    pub target: Vec<usize>,
    pub value: Vec<usize>,
}

/// Source→tactic→platform flow graph
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SankeyGraph {
    pub nodes: Vec<String>,
    pub links: SankeyLinks,
}

/// One clustered, 2D-projected threat record
#[derive(Debug, Clone, Serialize)]
pub struct ClusterPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub id: String,
    pub description: String,
    pub score: f64,
}

/// Average exploitability score of one cluster
#[derive(Debug, Clone, Serialize)]
pub struct ClusterScore {
    pub label: String,
    pub average_score: f64,
}

/// Sankey reshaped for the combined endpoint (`nodes` becomes `labels`)
#[derive(Debug, Clone, Serialize)]
pub struct VisualsSankey {
    pub labels: Vec<String>,
    pub links: SankeyLinks,
}

/// Everything the dashboard needs in one response
#[derive(Debug, Clone, Serialize)]
pub struct Visuals {
    pub pie: Vec<AttackVectorCount>,
    pub scatter: Vec<ScatterPoint>,
    pub sankey: VisualsSankey,
    pub tsne: Vec<ClusterPoint>,
}

impl From<SankeyGraph> for VisualsSankey {
    fn from(graph: SankeyGraph) -> Self {
        Self {
            labels: graph.nodes,
            links: graph.links,
        }
    }
}
