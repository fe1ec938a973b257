//! Configuration module

use std::env;

/// Default remote corpus location
const DEFAULT_FEED_URL: &str =
    "https://raw.githubusercontent.com/Jiyapanwar/cheel/main/data/Threats.json";

/// Default id→label table for the three semantic buckets this dataset
/// is expected to split into. Overridable via CLUSTER_LABELS.
const DEFAULT_CLUSTER_LABELS: &[&str] = &[
    "XSS & Scripting",
    "Sensitive Data Exposure",
    "Authorization Flaws",
];

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Remote corpus URL (tried first)
    pub feed_url: String,

    /// Local corpus file used when the remote fetch fails
    pub data_path: String,

    /// Remote fetch timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Number of k-means clusters
    pub cluster_count: usize,

    /// Cluster id → label table, indexed by cluster id
    pub cluster_labels: Vec<String>,

    /// t-SNE perplexity
    pub tsne_perplexity: f64,

    /// Seed for k-means init and the t-SNE starting layout
    pub random_seed: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            feed_url: env::var("FEED_URL")
                .unwrap_or_else(|_| DEFAULT_FEED_URL.to_string()),

            data_path: env::var("DATA_PATH")
                .unwrap_or_else(|_| "data/Threats.json".to_string()),

            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(30),

            cluster_count: env::var("CLUSTER_COUNT")
                .ok()
                .and_then(|k| k.parse().ok())
                .unwrap_or(3),

            cluster_labels: env::var("CLUSTER_LABELS")
                .map(|s| s.split(',').map(|l| l.trim().to_string()).collect())
                .unwrap_or_else(|_| {
                    DEFAULT_CLUSTER_LABELS.iter().map(|l| l.to_string()).collect()
                }),

            tsne_perplexity: env::var("TSNE_PERPLEXITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30.0),

            random_seed: env::var("RANDOM_SEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(42),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Label for a cluster id; ids past the table get a generic name
    pub fn cluster_label(&self, id: usize) -> String {
        self.cluster_labels
            .get(id)
            .cloned()
            .unwrap_or_else(|| format!("Cluster {}", id))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
