//! Reply text rendering and segment batching.
//!
//! Everything a handset ends up reading is built here: per-record fragments,
//! distance wording, query headers, the no-results fallback, and the packing
//! of ranked records into segments that respect the configured character
//! budget. Budgets count characters, not bytes.

use tracing::debug;
use waypost_ingest::ResourceRecord;

use crate::{config::LocateConfig, gazetteer::METERS_PER_MILE, locate::RankedResult};

/// Reply for a message with no usable postal code in it.
pub const EMPTY_QUERY_APOLOGY: &str = "Sorry, I couldn't find a postal code in your message. \
     Please reply with a 5-digit ZIP code and I'll look for nearby resources!";

/// Reply for a query code with nothing nearby.
pub fn fallback_segment(postal_code: &str) -> String {
    format!("Sorry, I don't know about any resources near {postal_code}. Please try again later!")
}

fn header(count: usize, resource_kind: &str, postal_code: &str) -> String {
    format!("Found {count} {resource_kind} near {postal_code}:")
}

/// Human wording for a distance in meters.
///
/// Distances are always rounded up, so a resource is never reported closer
/// than it is: below one mile the wording is `Under 1mi away`, otherwise the
/// mile count is ceiled to a whole number.
pub fn distance_phrase(meters: f64) -> String {
    let miles = meters / METERS_PER_MILE;
    let tenths = (miles * 10.0).ceil() / 10.0;
    if tenths < 1.0 {
        "Under 1mi away".to_string()
    } else {
        format!("About {}mi away", miles.ceil() as u64)
    }
}

/// Multi-line display fragment for one record: name, address, and the phone
/// line only when a usable phone is present.
pub fn render_fragment(record: &ResourceRecord) -> String {
    let mut fragment = format!("{}\n{}", record.name, record.address);
    if let Some(phone) = record
        .phone
        .as_deref()
        .filter(|phone| !phone.trim().is_empty())
    {
        fragment.push('\n');
        fragment.push_str(phone);
    }
    fragment
}

/// Pack ranked results into reply segments, one query after another.
pub fn batch_segments(results: &[RankedResult], config: &LocateConfig) -> Vec<String> {
    let segments: Vec<String> = results
        .iter()
        .flat_map(|result| segments_for_query(result, config))
        .collect();
    debug!(
        queries = results.len(),
        segments = segments.len(),
        "Reply segments batched"
    );
    segments
}

/// Segments for a single query: a header plus blank-line-separated record
/// blocks. When appending a block would push the segment past the budget the
/// segment is flushed first; a block landing in a fresh segment is accepted
/// even if it alone exceeds the budget.
fn segments_for_query(result: &RankedResult, config: &LocateConfig) -> Vec<String> {
    if result.records.is_empty() {
        return vec![fallback_segment(&result.query_code)];
    }

    let mut segments = Vec::new();
    let mut current = header(
        result.records.len(),
        &config.resource_kind,
        &result.query_code,
    );
    let mut current_chars = current.chars().count();

    for augmented in &result.records {
        let meters = augmented
            .distance_to(&result.query_code)
            .unwrap_or_default();
        let block = format!("{}\n{}", augmented.message, distance_phrase(meters));
        let block_chars = block.chars().count();

        if !current.is_empty() && current_chars + 2 + block_chars > config.segment_budget {
            segments.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if current.is_empty() {
            current = block;
            current_chars = block_chars;
        } else {
            current.push_str("\n\n");
            current.push_str(&block);
            current_chars += 2 + block_chars;
        }
    }
    segments.push(current);
    segments
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use waypost_ingest::RecordIndex;

    use super::*;
    use crate::locate::AugmentedRecord;

    fn record(name: &str, phone: Option<&str>) -> ResourceRecord {
        ResourceRecord {
            index: RecordIndex::Number(1),
            name: name.to_string(),
            address: "100 Main St, Testville, NE 68850".to_string(),
            phone: phone.map(str::to_string),
            postal_code: "68850".to_string(),
            latitude: 40.7810,
            longitude: -99.7415,
            metadata: serde_json::Map::new(),
        }
    }

    fn augmented(name: &str, query_code: &str, meters: f64) -> AugmentedRecord {
        let record = record(name, Some("(308) 555-0142"));
        AugmentedRecord {
            message: render_fragment(&record),
            record,
            distances: HashMap::from([(query_code.to_string(), meters)]),
            in_radius: HashMap::from([(query_code.to_string(), true)]),
        }
    }

    fn ranked(query_code: &str, records: Vec<AugmentedRecord>) -> RankedResult {
        RankedResult {
            query_code: query_code.to_string(),
            records,
        }
    }

    #[test]
    fn test_distance_phrase_under_one_mile() {
        assert_eq!(distance_phrase(0.0), "Under 1mi away");
        assert_eq!(distance_phrase(1000.0), "Under 1mi away");
    }

    #[test]
    fn test_distance_phrase_exactly_one_mile() {
        assert_eq!(distance_phrase(METERS_PER_MILE), "About 1mi away");
    }

    #[test]
    fn test_distance_phrase_rounds_up() {
        // 11.06 miles reads as 12: never understate the distance
        assert_eq!(distance_phrase(17_800.0), "About 12mi away");
        // Just over a mile already rounds to 2
        assert_eq!(distance_phrase(METERS_PER_MILE * 1.01), "About 2mi away");
    }

    #[test]
    fn test_fragment_includes_phone_when_present() {
        let fragment = render_fragment(&record("Community Hall", Some("(308) 555-0142")));
        assert_eq!(
            fragment,
            "Community Hall\n100 Main St, Testville, NE 68850\n(308) 555-0142"
        );
    }

    #[test]
    fn test_fragment_skips_missing_or_blank_phone() {
        let fragment = render_fragment(&record("Community Hall", None));
        assert_eq!(fragment, "Community Hall\n100 Main St, Testville, NE 68850");

        let fragment = render_fragment(&record("Community Hall", Some("  ")));
        assert!(!fragment.ends_with("  "));
        assert_eq!(fragment.lines().count(), 2);
    }

    #[test]
    fn test_fallback_segment_text() {
        assert_eq!(
            fallback_segment("59001"),
            "Sorry, I don't know about any resources near 59001. Please try again later!"
        );
    }

    #[test]
    fn test_no_records_yields_fallback() {
        let segments = batch_segments(&[ranked("59001", Vec::new())], &LocateConfig::default());
        assert_eq!(segments, vec![fallback_segment("59001")]);
    }

    #[test]
    fn test_single_segment_layout() {
        let result = ranked(
            "68850",
            vec![augmented("Recreation Center", "68850", 0.0)],
        );
        let segments = batch_segments(&[result], &LocateConfig::default());

        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0],
            "Found 1 shelters near 68850:\n\n\
             Recreation Center\n100 Main St, Testville, NE 68850\n(308) 555-0142\nUnder 1mi away"
        );
    }

    #[test]
    fn test_budget_flushes_into_new_segment() {
        let config = LocateConfig {
            segment_budget: 120,
            ..LocateConfig::default()
        };
        let result = ranked(
            "68850",
            vec![
                augmented("First Shelter", "68850", 0.0),
                augmented("Second Shelter", "68850", 3000.0),
            ],
        );
        let segments = batch_segments(&[result], &config);

        assert_eq!(segments.len(), 2);
        assert!(segments[0].starts_with("Found 2 shelters near 68850:"));
        assert!(segments[0].contains("First Shelter"));
        // Continuation segment carries no header
        assert!(segments[1].starts_with("Second Shelter"));
        assert!(segments[0].chars().count() <= 120);
    }

    #[test]
    fn test_oversized_block_is_accepted_alone() {
        let config = LocateConfig {
            segment_budget: 40,
            ..LocateConfig::default()
        };
        let result = ranked("68850", vec![augmented("Shelter", "68850", 0.0)]);
        let segments = batch_segments(&[result], &config);

        // Header flushes, then the single block lands in its own segment even
        // though it exceeds the budget by itself
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], "Found 1 shelters near 68850:");
        assert!(segments[1].chars().count() > 40);
    }

    #[test]
    fn test_queries_batch_in_order() {
        let results = vec![
            ranked("68850", vec![augmented("Nebraska Shelter", "68850", 0.0)]),
            ranked("59001", Vec::new()),
        ];
        let segments = batch_segments(&results, &LocateConfig::default());

        assert_eq!(segments.len(), 2);
        assert!(segments[0].contains("near 68850"));
        assert_eq!(segments[1], fallback_segment("59001"));
    }
}
