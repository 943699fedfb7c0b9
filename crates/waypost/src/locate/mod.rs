//! The locate pipeline: candidate resolution, distance augmentation,
//! deduplication, and per-query ranking.

mod pipeline;

pub use pipeline::{
    AugmentedRecord, RankedResult, augment_records, candidate_codes, dedup_keep_last, rank_nearby,
    resolve_lookups,
};
