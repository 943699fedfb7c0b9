//! Resource records and the postal-code index built from one feed snapshot.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{IngestError, Result};

/// Stable identity of a resource record within one dataset snapshot.
///
/// Feeds carry either numeric or string identifiers; both are accepted and
/// compared by value, so `Number(1)` and `Text("1")` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordIndex {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for RecordIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<u64> for RecordIndex {
    fn from(number: u64) -> Self {
        Self::Number(number)
    }
}

impl From<&str> for RecordIndex {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// One relief resource (shelter, supply point) from the upstream feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub index: RecordIndex,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    /// Postal code the resource sits in, as listed by the feed.
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Feed properties preserved verbatim for downstream consumers.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Records grouped by their owning postal code.
///
/// Built wholesale from one feed snapshot and replaced wholesale on refresh;
/// nothing mutates an index in place. Backed by a `BTreeMap` so `keys()`
/// iterates postal codes in sorted order, which keeps candidate expansion
/// deterministic.
#[derive(Debug, Clone)]
pub struct ResourceIndex {
    by_code: BTreeMap<String, Vec<ResourceRecord>>,
    record_count: usize,
    built_at: DateTime<Utc>,
}

impl Default for ResourceIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl ResourceIndex {
    /// An index with no records, timestamped now.
    pub fn empty() -> Self {
        Self {
            by_code: BTreeMap::new(),
            record_count: 0,
            built_at: Utc::now(),
        }
    }

    /// Group records under their owning postal code.
    ///
    /// Every record identity must be unique within the snapshot; a duplicate
    /// fails the whole build so a bad feed never half-replaces a good index.
    pub fn from_records(records: Vec<ResourceRecord>) -> Result<Self> {
        let mut seen: HashSet<RecordIndex> = HashSet::with_capacity(records.len());
        let mut by_code: BTreeMap<String, Vec<ResourceRecord>> = BTreeMap::new();
        let record_count = records.len();

        for record in records {
            if !seen.insert(record.index.clone()) {
                return Err(IngestError::DuplicateRecordIndex(record.index));
            }
            by_code
                .entry(record.postal_code.clone())
                .or_default()
                .push(record);
        }

        info!(
            codes = by_code.len(),
            records = record_count,
            "Resource index built"
        );
        Ok(Self {
            by_code,
            record_count,
            built_at: Utc::now(),
        })
    }

    /// Records located in `postal_code`, if any.
    pub fn get(&self, postal_code: &str) -> Option<&[ResourceRecord]> {
        self.by_code.get(postal_code).map(Vec::as_slice)
    }

    /// Postal codes with at least one record, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_code.keys().map(String::as_str)
    }

    pub fn contains_code(&self, postal_code: &str) -> bool {
        self.by_code.contains_key(postal_code)
    }

    pub fn code_count(&self) -> usize {
        self.by_code.len()
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// When this snapshot was assembled.
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}
