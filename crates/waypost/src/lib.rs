//! Waypost - Proximity Resource Lookup Library
//!
//! Waypost answers the question "what relief resources are near this postal
//! code?" over SMS-sized text. It combines the `GeoNames` postal gazetteer
//! with a periodically refreshed resource feed, ranks everything within a
//! radius by geodesic distance, and packs the results into reply segments
//! that fit a configurable character budget.
//!
//! # Quick Start
//!
//! ```rust
//! use waypost::{PostalGazetteer, ResourceLocator};
//! use waypost::ingest::index_from_feed;
//! use waypost::ingest::test_data::{TestDataConfig, postal_fixture_rows, sample_feed_json};
//!
//! // Build the gazetteer and resource index from the bundled sample data.
//! let fixtures = TestDataConfig::sample();
//! let gazetteer = PostalGazetteer::from_rows(postal_fixture_rows(&fixtures));
//! let index = index_from_feed(&sample_feed_json(&fixtures))?;
//!
//! let locator = ResourceLocator::builder(gazetteer).index(index).build();
//!
//! // One run of reply segments per query code, ready for SMS.
//! let replies = locator.locate(&["68850"]);
//! assert!(replies[0].starts_with("Found 2 shelters near 68850:"));
//!
//! // Or start from a raw inbound message.
//! let replies = locator.locate_message("HELP shelter near 68850 please");
//! assert!(replies[0].contains("Lexington Optimist Recreation Center"));
//! # Ok::<(), waypost::error::WaypostError>(())
//! ```
//!
//! # Features
//!
//! - **Offline Gazetteer**: `GeoNames` postal dump parsed once, kept in memory
//! - **Radius Lookup**: Bounding-box prefilter plus WGS84 geodesic distances
//! - **SMS-Sized Replies**: Resource blocks packed under a character budget
//! - **Live Refresh**: Atomic index swaps while lookups keep running
//! - **Flexible Configuration**: Radius, result cap, budget, and reply wording
//!
//! # Data
//!
//! The gazetteer comes from the `GeoNames` postal dump, downloaded on first
//! use and cached on disk. Resource records come from a GeoJSON feed that can
//! be re-fetched on an interval; see [`ingest::FeedRefresher`]. Tests and
//! examples run offline against a small bundled fixture geography.

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
mod extract;
mod gazetteer;
mod locate;
mod message;
mod transport;

pub use self::core::{LocatorInfo, RankedResults, ResourceLocator, ResourceLocatorBuilder};

pub use config::{ConfigError, LocateConfig, LocateConfigBuilder};
pub use extract::extract_postal_codes;
pub use gazetteer::{Coordinate, GazetteerError, METERS_PER_MILE, PostalGazetteer, PostalLookup};
pub use locate::{AugmentedRecord, RankedResult};
pub use message::{EMPTY_QUERY_APOLOGY, distance_phrase};
pub use transport::{TRANSPORT_SEGMENT_LIMIT, finalize_segments};
pub use waypost_ingest as ingest;
pub use waypost_ingest::{RecordIndex, ResourceIndex, ResourceRecord};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Install the global tracing subscriber for the library.
///
/// `RUST_LOG` wins when set; otherwise `level` is the baseline, with the
/// noisier dependencies capped at warn. Calling it again is a no-op, so
/// library consumers and tests can both call it freely.
///
/// # Examples
///
/// ```rust
/// use tracing::Level;
/// use waypost::init_logging;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), waypost::error::WaypostError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::WaypostError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("polars=warn".parse().unwrap())
            .add_directive("hyper_util=warn".parse().unwrap());

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use waypost_ingest::index_from_feed;
    use waypost_ingest::test_data::{TestDataConfig, postal_fixture_rows, sample_feed_json};

    use super::*;

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    fn sample_locator() -> ResourceLocator {
        let fixtures = TestDataConfig::sample();
        let gazetteer = PostalGazetteer::from_rows(postal_fixture_rows(&fixtures));
        let index = index_from_feed(&sample_feed_json(&fixtures)).unwrap();
        ResourceLocator::builder(gazetteer).index(index).build()
    }

    #[test]
    fn test_locator_creation() {
        setup_test_env();

        let locator = sample_locator();
        let info = locator.info();
        assert_eq!(info.gazetteer_codes, 9);
        assert_eq!(info.index_codes, 6);
        assert_eq!(info.index_records, 6);
        assert!(info.has_resources());
        assert!(info.summary().contains("9 postal codes"));
    }

    #[test]
    fn test_locate_known_code() {
        setup_test_env();

        let locator = sample_locator();
        let replies = locator.locate(&["68850"]);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("Found 2 shelters near 68850:"));
    }

    #[test]
    fn test_locate_code_with_nothing_nearby() {
        setup_test_env();

        // Absarokee is in the gazetteer but no resource is within range.
        let locator = sample_locator();
        let replies = locator.locate(&["59001"]);
        assert_eq!(
            replies,
            vec![
                "Sorry, I don't know about any resources near 59001. Please try again later!"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_locate_unknown_code_yields_nothing() {
        setup_test_env();

        let locator = sample_locator();
        assert!(locator.locate(&["99999"]).is_empty());
    }

    #[test]
    fn test_locate_message_without_code() {
        setup_test_env();

        let locator = sample_locator();
        let replies = locator.locate_message("where is the nearest shelter?");
        assert_eq!(replies, vec![EMPTY_QUERY_APOLOGY.to_string()]);
    }

    #[test]
    fn test_configuration() {
        setup_test_env();

        let config = LocateConfigBuilder::nearby()
            .resource_kind("cooling centers")
            .build()
            .unwrap();
        assert!((config.radius_miles - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.max_per_query, 3);

        let fixtures = TestDataConfig::sample();
        let locator = ResourceLocator::builder(PostalGazetteer::from_rows(postal_fixture_rows(
            &fixtures,
        )))
        .index(index_from_feed(&sample_feed_json(&fixtures)).unwrap())
        .config(config)
        .build();

        let replies = locator.locate(&["71301"]);
        assert!(replies[0].contains("cooling centers near 71301"));
    }

    #[test]
    fn test_index_swap() {
        setup_test_env();

        let locator = sample_locator();
        assert!(!locator.locate(&["68850"]).is_empty());

        locator.update_index(ResourceIndex::empty());
        let replies = locator.locate(&["68850"]);
        assert!(replies[0].starts_with("Sorry"));
        assert_eq!(locator.info().index_records, 0);
    }
}
