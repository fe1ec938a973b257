//! Per-cluster CSV export
//!
//! Writes one CSV file per distinct cluster label into the target
//! directory, named after the label (lowercased, spaces → underscores).
//! Returns the number of files written.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::models::ClusterPoint;

const HEADER: &str = "x,y,label,id,description,score";

/// Export clustered points as one CSV per label
pub fn export_clusters(points: &[ClusterPoint], dir: &Path) -> io::Result<usize> {
    fs::create_dir_all(dir)?;

    // Labels in first-seen order
    let mut labels: Vec<&str> = Vec::new();
    for point in points {
        if !labels.contains(&point.label.as_str()) {
            labels.push(&point.label);
        }
    }

    for label in &labels {
        let filename = format!("{}.csv", label.to_lowercase().replace(' ', "_"));
        let mut file = File::create(dir.join(&filename))?;
        writeln!(file, "{}", HEADER)?;

        for point in points.iter().filter(|p| p.label == *label) {
            writeln!(
                file,
                "{},{},{},{},{},{}",
                point.x,
                point.y,
                csv_field(&point.label),
                csv_field(&point.id),
                csv_field(&point.description),
                point.score
            )?;
        }
        file.flush()?;
        tracing::info!("Exported cluster '{}' to {}", label, filename);
    }

    Ok(labels.len())
}

/// Quote a field when it contains a comma, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(label: &str, id: &str, description: &str) -> ClusterPoint {
        ClusterPoint {
            x: 1.5,
            y: -2.5,
            label: label.to_string(),
            id: id.to_string(),
            description: description.to_string(),
            score: 4.2,
        }
    }

    #[test]
    fn test_one_file_per_label() {
        let dir = tempfile::tempdir().unwrap();
        let points = vec![
            point("XSS & Scripting", "T1", "script injection"),
            point("Authorization Flaws", "T2", "broken access control"),
            point("XSS & Scripting", "T3", "dom based xss"),
        ];

        let written = export_clusters(&points, dir.path()).unwrap();
        assert_eq!(written, 2);
        assert!(dir.path().join("xss_&_scripting.csv").exists());
        assert!(dir.path().join("authorization_flaws.csv").exists());
    }

    #[test]
    fn test_every_point_lands_in_exactly_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let points = vec![
            point("A", "T1", "one"),
            point("B", "T2", "two"),
            point("A", "T3", "three"),
        ];
        export_clusters(&points, dir.path()).unwrap();

        let a = fs::read_to_string(dir.path().join("a.csv")).unwrap();
        let b = fs::read_to_string(dir.path().join("b.csv")).unwrap();
        // Header + 2 rows and header + 1 row
        assert_eq!(a.lines().count(), 3);
        assert_eq!(b.lines().count(), 2);
        assert!(a.contains("T1") && a.contains("T3"));
        assert!(b.contains("T2"));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let points = vec![point("A", "T1", "leak of keys, tokens, and hashes")];
        export_clusters(&points, dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("a.csv")).unwrap();
        assert!(content.contains("\"leak of keys, tokens, and hashes\""));
    }

    #[test]
    fn test_csv_field_escapes_quotes() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_export_of_pipeline_output() {
        use crate::config::Config;
        use crate::logic::{corpus, pipeline};
        use crate::models::RawCorpus;

        let config = Config {
            port: 8080,
            feed_url: String::new(),
            data_path: String::new(),
            fetch_timeout_secs: 30,
            cluster_count: 2,
            cluster_labels: vec!["Scripting".to_string(), "Data Exposure".to_string()],
            tsne_perplexity: 2.0,
            random_seed: 42,
            environment: "development".to_string(),
        };

        let raw: RawCorpus = serde_json::from_str(
            r#"{
                "High": [
                    {"id": "T1", "description": "cross site scripting payload injection"},
                    {"id": "T2", "description": "stored scripting payload executes injection"}
                ],
                "Medium": [
                    {"id": "T3", "description": "database credentials leaked exposure"},
                    {"id": "T4", "description": "credentials exposure leaked backup database"}
                ]
            }"#,
        )
        .unwrap();

        let records = corpus::flatten(&raw);
        let points = pipeline::cluster_view(&records, &config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = export_clusters(&points, dir.path()).unwrap();
        assert!(written >= 1);

        // Every point appears in some file exactly once
        let mut rows = 0;
        for entry in fs::read_dir(dir.path()).unwrap() {
            let content = fs::read_to_string(entry.unwrap().path()).unwrap();
            rows += content.lines().count() - 1;
        }
        assert_eq!(rows, points.len());
    }
}
