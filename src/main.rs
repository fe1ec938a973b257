//! Threatlens Backend Server
//!
//! Read-only analytics service over a static JSON corpus of
//! cybersecurity threat records.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       THREATLENS                           │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │  API      │  │  Aggregators │  │  Cluster Pipeline   │  │
//! │  │  (Axum)   │  │  (pie/scat/  │  │  (TF-IDF → k-means  │  │
//! │  │           │  │   sankey)    │  │   → t-SNE)          │  │
//! │  └─────┬─────┘  └──────┬───────┘  └──────────┬──────────┘  │
//! │        └───────────────┼─────────────────────┘             │
//! │                        ▼                                   │
//! │              ┌───────────────────┐                         │
//! │              │ Threat JSON feed  │                         │
//! │              │ (remote + local)  │                         │
//! │              └───────────────────┘                         │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logic;
mod models;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "threatlens=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // One-shot mode: `threatlens export [dir]` writes per-cluster CSVs
    // and exits instead of serving
    let mut args = std::env::args().skip(1);
    if let Some(command) = args.next() {
        match command.as_str() {
            "export" => {
                let dir = args.next().unwrap_or_else(|| "clusters_csv".to_string());
                if let Err(err) = run_export(&config, &dir).await {
                    tracing::error!("Cluster export failed: {}", err);
                    std::process::exit(1);
                }
                return;
            }
            other => {
                tracing::error!("Unknown command '{}', expected 'export'", other);
                std::process::exit(2);
            }
        }
    }

    tracing::info!("Threatlens server starting...");
    tracing::info!("Corpus feed: {}", config.feed_url);
    tracing::info!("Local fallback: {}", config.data_path);

    // Build application state
    let state = AppState {
        http: reqwest::Client::new(),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server port");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}

/// Load the corpus, run the cluster pipeline, and write one CSV per
/// cluster into `dir`
async fn run_export(config: &config::Config, dir: &str) -> AppResult<()> {
    let client = reqwest::Client::new();
    let raw = logic::corpus::load(&client, config).await?;
    let records = logic::corpus::flatten(&raw);

    let pipeline_config = config.clone();
    let points =
        tokio::task::spawn_blocking(move || logic::pipeline::cluster_view(&records, &pipeline_config))
            .await??;

    let written = logic::export::export_clusters(&points, std::path::Path::new(dir))
        .map_err(|err| AppError::InternalError(format!("csv export failed: {}", err)))?;
    tracing::info!("Wrote {} cluster files to {}", written, dir);
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/attack-vectors", get(handlers::attack_vectors::list))
        .route("/api/scatter", get(handlers::scatter::list))
        .route("/api/sankey", get(handlers::sankey::get))
        .route("/api/clustering", get(handlers::clustering::list))
        .route("/api/clustering/averages", get(handlers::clustering::averages))
        .route("/api/visuals", get(handlers::visuals::get))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
