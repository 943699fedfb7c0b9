//! Live feed refresh against a shared locator
//!
//! This example wires a periodically refreshed resource feed into a locator
//! shared across tasks:
//! - The gazetteer is loaded once and never changes
//! - A background task polls the feed and swaps the index atomically
//! - Lookups keep answering throughout, against whichever snapshot is current
//!
//! It needs a real feed, so it exits quietly unless `FEED_URL` is set:
//!
//! ```sh
//! FEED_URL=https://example.org/resources.geojson cargo run --example live_refresh
//! ```

use std::sync::Arc;
use std::time::Duration;

use waypost::ingest::{FeedRefresher, PostalSource, load_postal_rows};
use waypost::{LocateConfig, PostalGazetteer, ResourceLocator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    waypost::init_logging(tracing::Level::INFO)?;

    let Ok(feed_url) = std::env::var("FEED_URL") else {
        println!("Set FEED_URL to a GeoJSON resource feed to run this example.");
        return Ok(());
    };

    // The loader is synchronous and may download on first run, so it runs
    // off the runtime threads
    let rows =
        tokio::task::spawn_blocking(|| load_postal_rows(&PostalSource::UnitedStates)).await??;
    let gazetteer = PostalGazetteer::from_rows(rows);
    let locator = Arc::new(ResourceLocator::new(gazetteer, LocateConfig::default()));

    // The first tick fires immediately, so the locator has data as soon as
    // the feed responds; after that the loop wakes every five minutes
    let refresher = FeedRefresher::new(feed_url, Duration::from_secs(300));
    let refresh_locator = Arc::clone(&locator);
    tokio::spawn(refresher.run(move |index| refresh_locator.update_index(index)));

    // Meanwhile, keep answering queries against the current snapshot
    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(5)).await;

        let info = locator.info();
        println!(
            "Index built {} holds {} records under {} codes",
            info.index_built_at, info.index_records, info.index_codes
        );
        for reply in locator.locate_message("shelter near 68850?") {
            println!("{reply}");
        }
    }

    Ok(())
}
