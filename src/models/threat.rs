//! Threat corpus models
//!
//! Two record shapes exist on purpose: `RawThreatRecord` mirrors the wire
//! JSON where every field may be absent, and `ThreatRecord` is the
//! flattened shape downstream views consume, with documented defaults
//! filled in exactly once at the flattening boundary.

use std::fmt;

use chrono::NaiveDateTime;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// The corpus as fetched: top-level keys are category/tactic names, each
/// holding an ordered array of raw records.
///
/// Category order follows the JSON document, which is what makes Sankey
/// node indices reproducible across loads of the same file.
#[derive(Debug, Clone, Default)]
pub struct RawCorpus {
    pub categories: Vec<(String, Vec<RawThreatRecord>)>,
}

impl RawCorpus {
    /// Total number of records across all categories
    pub fn len(&self) -> usize {
        self.categories.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'de> Deserialize<'de> for RawCorpus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CorpusVisitor;

        impl<'de> Visitor<'de> for CorpusVisitor {
            type Value = RawCorpus;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to an array of threat records")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut categories = Vec::new();
                while let Some(entry) = map.next_entry::<String, Vec<RawThreatRecord>>()? {
                    categories.push(entry);
                }
                Ok(RawCorpus { categories })
            }
        }

        deserializer.deserialize_map(CorpusVisitor)
    }
}

/// A threat record exactly as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawThreatRecord {
    pub id: Option<String>,
    pub description: Option<String>,
    pub exploitability_score: Option<f64>,
    pub published_date: Option<String>,
    pub attack_vector: Option<String>,
    pub source: Option<String>,
    pub platforms: Option<Vec<String>>,
}

/// A flattened threat record tagged with the category it was nested under
///
/// `id` and `description` stay optional: only the clustering view needs
/// them, and it decides per record whether their absence is malformed.
/// `exploitability_score` stays optional so the scatter view can tell a
/// missing score apart from a real 0.0.
#[derive(Debug, Clone)]
pub struct ThreatRecord {
    pub id: Option<String>,
    pub description: Option<String>,
    pub exploitability_score: Option<f64>,
    pub published_date: Option<NaiveDateTime>,
    pub attack_vector: String,
    pub source: String,
    pub platforms: Vec<String>,
    pub category: String,
}

impl ThreatRecord {
    /// Build the flattened shape from a raw record and its category,
    /// applying the documented defaults
    pub fn from_raw(raw: &RawThreatRecord, category: &str) -> Self {
        Self {
            id: raw.id.clone(),
            description: raw.description.clone(),
            exploitability_score: raw.exploitability_score,
            published_date: raw.published_date.as_deref().and_then(parse_iso_date),
            attack_vector: raw
                .attack_vector
                .clone()
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            source: raw.source.clone().unwrap_or_else(|| "Unknown".to_string()),
            platforms: raw
                .platforms
                .clone()
                .unwrap_or_else(|| vec!["Unknown".to_string()]),
            category: category.to_string(),
        }
    }
}

/// Parse an ISO-8601 timestamp, accepting a bare date or a full
/// date-time with optional fractional seconds. Unparseable input is
/// treated the same as a missing field.
fn parse_iso_date(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}
