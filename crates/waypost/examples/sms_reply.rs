//! End-to-end SMS reply handling
//!
//! This example demonstrates the message-level API:
//! - Extracting postal codes from free-form inbound text
//! - The apology reply when no code can be found
//! - Segment numbering when a reply does not fit one message

use waypost::ingest::index_from_feed;
use waypost::ingest::test_data::{TestDataConfig, postal_fixture_rows, sample_feed_json};
use waypost::{LocateConfig, PostalGazetteer, ResourceLocator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fixtures = TestDataConfig::sample();
    let gazetteer = PostalGazetteer::from_rows(postal_fixture_rows(&fixtures));
    let index = index_from_feed(&sample_feed_json(&fixtures))?;

    let locator = ResourceLocator::builder(gazetteer)
        .index(index.clone())
        .config(LocateConfig::default())
        .build();

    // A typical inbound message, the ZIP is picked out of the text
    show_exchange(&locator, "HELP we need a shelter near 68850 please");

    // ZIP+4 input works too, only the five-digit part is used
    show_exchange(&locator, "We are at 71301-2405. Where can we go?");

    // No postal code at all gets the apology
    show_exchange(&locator, "is there anywhere to sleep tonight?");

    // With a tight per-message budget the reply spans several numbered
    // segments, the way a carrier would deliver it
    let tight = ResourceLocator::builder(PostalGazetteer::from_rows(postal_fixture_rows(
        &fixtures,
    )))
    .index(index)
    .config(LocateConfig::builder().segment_budget(150).build()?)
    .build();
    show_exchange(&tight, "shelter 68850");

    Ok(())
}

fn show_exchange(locator: &ResourceLocator, inbound: &str) {
    println!(">>> {inbound}");
    for reply in locator.locate_message(inbound) {
        println!("<<< {reply}");
    }
    println!();
}
