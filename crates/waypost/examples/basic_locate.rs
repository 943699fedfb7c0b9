//! Basic proximity lookup functionality
//!
//! This example demonstrates the fundamental lookup operations:
//! - Building a locator from the bundled fixture geography
//! - Looking up resources for one or several postal codes
//! - The fallback reply when nothing is in range

use waypost::ingest::index_from_feed;
use waypost::ingest::test_data::{TestDataConfig, postal_fixture_rows, sample_feed_json};
use waypost::{LocateConfig, PostalGazetteer, ResourceLocator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build the gazetteer and resource index from the bundled sample data
    // (two clusters in Nebraska and Louisiana, no downloads needed)
    let fixtures = TestDataConfig::sample();
    let gazetteer = PostalGazetteer::from_rows(postal_fixture_rows(&fixtures));
    let index = index_from_feed(&sample_feed_json(&fixtures))?;

    let locator = ResourceLocator::builder(gazetteer)
        .index(index)
        .config(LocateConfig::default())
        .build();
    println!("{}\n", locator.info().summary());

    // Single postal code
    println!("Resources near 68850 (Lexington, NE):");
    print_replies(&locator.locate(&["68850"]));

    // Several codes in one request, one reply run per code
    println!("\nResources near 68850 and 71301:");
    print_replies(&locator.locate(&["68850", "71301"]));

    // A code the gazetteer knows but with nothing nearby
    println!("\nResources near 59001 (Absarokee, MT):");
    print_replies(&locator.locate(&["59001"]));

    // Structured access, for consumers that are not SMS
    println!("\nRanked records for 71301:");
    for result in locator.rank(&["71301"]) {
        for record in &result.records {
            let meters = record.distance_to(&result.query_code).unwrap_or_default();
            println!(
                "  {} - {:.1} miles",
                record.record.name,
                meters / waypost::METERS_PER_MILE
            );
        }
    }

    Ok(())
}

fn print_replies(replies: &[String]) {
    for (i, reply) in replies.iter().enumerate() {
        println!("--- segment {} ---", i + 1);
        println!("{reply}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        let _ = waypost::init_logging(tracing::Level::WARN);
    }

    #[test]
    fn test_basic_locate_example() {
        setup_test_env();
        assert!(main().is_ok(), "Basic locate example should run successfully");
    }
}
