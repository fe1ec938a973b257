//! Corpus loading and flattening
//!
//! The corpus is fetched from the remote feed first; any failure there
//! (network, non-2xx, parse) falls back to the local file. Only when
//! both fail does the caller see `DataUnavailable`. One fallback, no
//! retries.

use std::collections::HashSet;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{RawCorpus, ThreatRecord};

/// Load the threat corpus, remote first with local fallback
pub async fn load(client: &reqwest::Client, config: &Config) -> AppResult<RawCorpus> {
    match fetch_remote(client, config).await {
        Ok(corpus) => {
            if corpus.is_empty() {
                tracing::warn!("Remote corpus at {} contains no records", config.feed_url);
            }
            tracing::debug!("Loaded {} records from {}", corpus.len(), config.feed_url);
            Ok(corpus)
        }
        Err(remote_err) => {
            tracing::warn!(
                "Remote corpus fetch failed ({}), falling back to {}",
                remote_err,
                config.data_path
            );
            load_local(&config.data_path).await.map_err(|local_err| {
                AppError::DataUnavailable(format!(
                    "remote: {}; local: {}",
                    remote_err, local_err
                ))
            })
        }
    }
}

async fn fetch_remote(client: &reqwest::Client, config: &Config) -> Result<RawCorpus, String> {
    let response = client
        .get(&config.feed_url)
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("unexpected status {}", response.status()));
    }

    response.json::<RawCorpus>().await.map_err(|e| e.to_string())
}

async fn load_local(path: &str) -> Result<RawCorpus, String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| e.to_string())?;
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

/// Flatten the nested corpus into one record sequence, tagging each
/// record with the category it was nested under.
///
/// Duplicate ids across categories are allowed (no derived view keys by
/// id) but logged so the feed can be fixed upstream.
pub fn flatten(corpus: &RawCorpus) -> Vec<ThreatRecord> {
    let mut records = Vec::with_capacity(corpus.len());
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (category, raws) in &corpus.categories {
        for raw in raws {
            let record = ThreatRecord::from_raw(raw, category);
            if let Some(id) = &record.id {
                if !seen_ids.insert(id.clone()) {
                    tracing::warn!("Duplicate threat id '{}' in category '{}'", id, category);
                }
            }
            records.push(record);
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_corpus() -> RawCorpus {
        serde_json::from_str(
            r#"{
                "High": [
                    {"id": "T1", "description": "script injection", "attackVector": "NETWORK"},
                    {"id": "T2", "description": "token leak"}
                ],
                "Low": [
                    {"id": "T3"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_flatten_counts_every_record() {
        let corpus = sample_corpus();
        let records = flatten(&corpus);
        assert_eq!(records.len(), 3);
        assert_eq!(records.len(), corpus.len());
    }

    #[test]
    fn test_flatten_tags_category() {
        let records = flatten(&sample_corpus());
        assert_eq!(records[0].category, "High");
        assert_eq!(records[2].category, "Low");
    }

    #[test]
    fn test_flatten_applies_defaults() {
        let records = flatten(&sample_corpus());
        // T2 has no attackVector
        assert_eq!(records[1].attack_vector, "UNKNOWN");
        assert_eq!(records[1].source, "Unknown");
        // T3 has no description; flatten keeps it, views decide
        assert!(records[2].description.is_none());
    }

    #[test]
    fn test_flatten_tolerates_duplicate_ids() {
        let corpus: RawCorpus = serde_json::from_str(
            r#"{"High": [{"id": "T1"}], "Low": [{"id": "T1"}]}"#,
        )
        .unwrap();
        let records = flatten(&corpus);
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_load_local_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"High": [{{"id": "T1", "description": "xss"}}]}}"#
        )
        .unwrap();

        let corpus = load_local(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.categories[0].0, "High");
    }

    #[tokio::test]
    async fn test_load_local_missing_file() {
        let err = load_local("/nonexistent/Threats.json").await.unwrap_err();
        assert!(!err.is_empty());
    }
}
