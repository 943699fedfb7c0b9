use std::collections::HashMap;

use itertools::Itertools;
use tracing::{debug, warn};
use waypost_ingest::{ResourceIndex, ResourceRecord};

use crate::{
    gazetteer::{Coordinate, PostalGazetteer, PostalLookup},
    message,
};

/// A resource record carrying per-query distance and radius membership, plus
/// its pre-rendered display fragment.
///
/// `in_radius` is postal-code-level membership decided by the gazetteer's
/// radius set, while `distances` is the exact geodesic measure to the record's
/// own coordinate. The two deliberately disagree in precision: a record stays
/// reportable whenever its postal code is in radius, even if its exact
/// distance says otherwise.
#[derive(Debug, Clone)]
pub struct AugmentedRecord {
    pub record: ResourceRecord,
    /// Geodesic meters from each query postal code's centroid to the record.
    pub distances: HashMap<String, f64>,
    /// Whether the record's postal code is in each query's radius set.
    pub in_radius: HashMap<String, bool>,
    /// Display fragment: name, address, optional phone.
    pub message: String,
}

impl AugmentedRecord {
    pub fn distance_to(&self, query_code: &str) -> Option<f64> {
        self.distances.get(query_code).copied()
    }

    pub fn in_radius_of(&self, query_code: &str) -> bool {
        self.in_radius.get(query_code).copied().unwrap_or(false)
    }
}

/// Resources ranked for one query postal code, nearest first, already
/// truncated to the configured maximum.
#[derive(Debug, Clone)]
pub struct RankedResult {
    pub query_code: String,
    pub records: Vec<AugmentedRecord>,
}

/// Resolve query codes against the gazetteer. Codes the gazetteer does not
/// know are logged and skipped; the rest of the pipeline never sees them.
pub fn resolve_lookups<Code>(
    gazetteer: &PostalGazetteer,
    query_codes: &[Code],
    radius_miles: f64,
) -> Vec<PostalLookup>
where
    Code: AsRef<str>,
{
    query_codes
        .iter()
        .filter_map(|code| match gazetteer.lookup(code.as_ref(), radius_miles) {
            Ok(lookup) => Some(lookup),
            Err(error) => {
                warn!(%error, "Skipping unresolvable query postal code");
                None
            }
        })
        .collect()
}

/// Index codes worth pulling records for: every indexed postal code that sits
/// in some query's radius set. Walked lookup by lookup, in the index's sorted
/// key order within each, so a code near two queries appears twice here and
/// the dedup pass downstream settles it.
pub fn candidate_codes(lookups: &[PostalLookup], index: &ResourceIndex) -> Vec<String> {
    let mut candidates = Vec::new();
    for lookup in lookups {
        for code in index.keys() {
            if lookup.contains(code) {
                candidates.push(code.to_string());
            }
        }
    }
    candidates
}

/// Pull the records under each candidate code and attach distances, radius
/// membership, and the display fragment for every query.
pub fn augment_records(
    candidates: &[String],
    index: &ResourceIndex,
    lookups: &[PostalLookup],
) -> Vec<AugmentedRecord> {
    let mut augmented = Vec::new();
    for code in candidates {
        let Some(records) = index.get(code) else {
            continue;
        };
        for record in records {
            augmented.push(augment_one(record, lookups));
        }
    }
    augmented
}

fn augment_one(record: &ResourceRecord, lookups: &[PostalLookup]) -> AugmentedRecord {
    let location = Coordinate::new(record.latitude, record.longitude);
    let mut distances = HashMap::with_capacity(lookups.len());
    let mut in_radius = HashMap::with_capacity(lookups.len());
    for lookup in lookups {
        distances.insert(
            lookup.postal_code.clone(),
            lookup.coordinate.distance_meters(location),
        );
        in_radius.insert(
            lookup.postal_code.clone(),
            lookup.contains(&record.postal_code),
        );
    }
    AugmentedRecord {
        message: message::render_fragment(record),
        record: record.clone(),
        distances,
        in_radius,
    }
}

/// Collapse duplicate record indexes, keeping the last occurrence of each
/// while preserving the relative order of everything kept. Running it twice
/// changes nothing.
pub fn dedup_keep_last(records: Vec<AugmentedRecord>) -> Vec<AugmentedRecord> {
    let mut kept: Vec<AugmentedRecord> = records
        .into_iter()
        .rev()
        .unique_by(|augmented| augmented.record.index.clone())
        .collect();
    kept.reverse();
    kept
}

/// Rank the deduplicated records for one query: keep those whose postal code
/// is in the query's radius, sort ascending by exact distance (stable, so
/// equal distances keep their order), and truncate to `max_per_query`.
pub fn rank_for_query(
    records: &[AugmentedRecord],
    query_code: &str,
    max_per_query: usize,
) -> RankedResult {
    let mut ranked: Vec<AugmentedRecord> = records
        .iter()
        .filter(|augmented| augmented.in_radius_of(query_code))
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        let da = a.distance_to(query_code).unwrap_or(f64::INFINITY);
        let db = b.distance_to(query_code).unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });
    ranked.truncate(max_per_query);
    RankedResult {
        query_code: query_code.to_string(),
        records: ranked,
    }
}

/// Run the shared pipeline stages once, then rank per query.
pub fn rank_nearby(
    lookups: &[PostalLookup],
    index: &ResourceIndex,
    max_per_query: usize,
) -> Vec<RankedResult> {
    if lookups.is_empty() {
        return Vec::new();
    }
    let candidates = candidate_codes(lookups, index);
    debug!(candidates = candidates.len(), "Candidate postal codes");
    let augmented = augment_records(&candidates, index, lookups);
    let deduped = dedup_keep_last(augmented);
    debug!(records = deduped.len(), "Distinct augmented records");
    lookups
        .iter()
        .map(|lookup| rank_for_query(&deduped, &lookup.postal_code, max_per_query))
        .collect()
}
