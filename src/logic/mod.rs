//! Analytics core
//!
//! Corpus loading/flattening, the TF-IDF → k-means → t-SNE clustering
//! pipeline, the counting aggregators, and the CSV export consumer.

pub mod aggregate;
pub mod corpus;
pub mod export;
pub mod kmeans;
pub mod pipeline;
pub mod tsne;
pub mod vectorizer;
