//! Core resource lookup functionality for the Waypost library.
//!
//! This module provides the main [`ResourceLocator`] interface for turning
//! postal codes into ranked, SMS-ready lists of nearby relief resources. It
//! combines a postal gazetteer with a swappable resource index so replies stay
//! current while the locator itself is shared immutably.
//!
//! # Quick Start
//!
//! ```rust
//! use waypost::{LocateConfig, PostalGazetteer, ResourceLocator};
//! use waypost::ingest::PostalRow;
//!
//! let gazetteer = PostalGazetteer::from_rows([PostalRow {
//!     country_code: "US".into(),
//!     postal_code: "68850".into(),
//!     place_name: "Lexington".into(),
//!     admin1_name: Some("Nebraska".into()),
//!     admin1_code: Some("NE".into()),
//!     latitude: 40.7772,
//!     longitude: -99.7415,
//! }]);
//!
//! // No feed loaded yet, so every query gets the apology reply.
//! let locator = ResourceLocator::new(gazetteer, LocateConfig::default());
//! let replies = locator.locate(&["68850"]);
//! assert_eq!(replies.len(), 1);
//! assert!(replies[0].starts_with("Sorry"));
//! ```
//!
//! # Entry Points
//!
//! The locator provides several levels of access:
//! - **Message handling**: Take raw SMS text, extract codes, reply in segments
//! - **Code lookup**: Take already-extracted postal codes and build replies
//! - **Ranking**: Get the ranked records themselves, before any formatting
//! - **Index swap**: Replace the resource index atomically on feed refresh

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use waypost_ingest::ResourceIndex;

use crate::{
    config::LocateConfig,
    extract,
    gazetteer::PostalGazetteer,
    locate::{self, RankedResult},
    message, transport,
};

pub type RankedResults = Vec<RankedResult>;

/// The main resource locator that answers postal-code queries with nearby
/// resources.
///
/// This struct holds the postal gazetteer, the current resource index, and the
/// lookup configuration. The index sits behind an atomic swap, so one locator
/// can be shared across threads while a background refresher replaces the
/// index wholesale; in-flight lookups keep the snapshot they started with.
///
/// # Examples
///
/// Basic usage:
/// ```rust
/// use waypost::{LocateConfig, PostalGazetteer, ResourceLocator};
/// use waypost::ingest::{PostalRow, ResourceIndex, ResourceRecord};
///
/// let gazetteer = PostalGazetteer::from_rows([PostalRow {
///     country_code: "US".into(),
///     postal_code: "68850".into(),
///     place_name: "Lexington".into(),
///     admin1_name: Some("Nebraska".into()),
///     admin1_code: Some("NE".into()),
///     latitude: 40.7772,
///     longitude: -99.7415,
/// }]);
///
/// let index = ResourceIndex::from_records(vec![ResourceRecord {
///     index: 1u64.into(),
///     name: "Optimist Recreation Center".into(),
///     address: "1500 Plum Creek Pkwy, Lexington, NE 68850".into(),
///     phone: None,
///     postal_code: "68850".into(),
///     latitude: 40.7689,
///     longitude: -99.7374,
///     metadata: Default::default(),
/// }])?;
///
/// let locator = ResourceLocator::builder(gazetteer).index(index).build();
/// let replies = locator.locate(&["68850"]);
/// assert!(replies[0].starts_with("Found 1 shelters near 68850:"));
/// # Ok::<(), waypost::error::WaypostError>(())
/// ```
///
/// With custom configuration:
/// ```rust
/// use waypost::{LocateConfig, PostalGazetteer, ResourceLocator};
///
/// let config = LocateConfig::builder()
///     .radius_miles(10.0)
///     .max_per_query(3)
///     .resource_kind("warming centers")
///     .build()?;
///
/// let locator = ResourceLocator::new(PostalGazetteer::default(), config);
/// # Ok::<(), waypost::error::WaypostError>(())
/// ```
pub struct ResourceLocator {
    gazetteer: PostalGazetteer,
    index: ArcSwap<ResourceIndex>,
    config: LocateConfig,
}

impl ResourceLocator {
    /// Create a new `ResourceLocator` with an empty resource index.
    ///
    /// Until [`update_index`](Self::update_index) installs a real index, every
    /// known postal code answers with the apology fallback.
    #[instrument(name = "Create ResourceLocator", level = "info", skip_all)]
    pub fn new(gazetteer: PostalGazetteer, config: LocateConfig) -> Self {
        Self::with_index(gazetteer, ResourceIndex::empty(), config)
    }

    /// Create a new `ResourceLocator` from pre-built components.
    pub fn with_index(
        gazetteer: PostalGazetteer,
        index: ResourceIndex,
        config: LocateConfig,
    ) -> Self {
        info!(
            gazetteer_codes = gazetteer.code_count(),
            index_codes = index.code_count(),
            index_records = index.record_count(),
            radius_miles = config.radius_miles,
            "Creating ResourceLocator"
        );
        Self {
            gazetteer,
            index: ArcSwap::from_pointee(index),
            config,
        }
    }

    /// Start building a `ResourceLocator` around a gazetteer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use waypost::{PostalGazetteer, ResourceLocator};
    ///
    /// let locator = ResourceLocator::builder(PostalGazetteer::default()).build();
    /// assert_eq!(locator.info().index_records, 0);
    /// ```
    #[must_use]
    pub fn builder(gazetteer: PostalGazetteer) -> ResourceLocatorBuilder {
        ResourceLocatorBuilder::new(gazetteer)
    }

    /// Answer a raw inbound message with transport-ready reply segments.
    ///
    /// Postal codes are extracted from the text first; a message with no
    /// recognizable code gets a single apology segment. Segments are numbered
    /// when there is more than one and clamped to the transport limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use waypost::{LocateConfig, PostalGazetteer, ResourceLocator};
    ///
    /// let locator = ResourceLocator::new(PostalGazetteer::default(), LocateConfig::default());
    /// let replies = locator.locate_message("is there a shelter near me?");
    /// assert_eq!(replies.len(), 1);
    /// assert!(replies[0].contains("5-digit ZIP code"));
    /// ```
    #[instrument(name = "Locate From Message", level = "info", skip_all)]
    pub fn locate_message(&self, text: &str) -> Vec<String> {
        let query_codes = extract::extract_postal_codes(text);
        let segments = if query_codes.is_empty() {
            vec![message::EMPTY_QUERY_APOLOGY.to_owned()]
        } else {
            self.locate(&query_codes)
        };
        transport::finalize_segments(segments)
    }

    /// Build reply segments for the given postal codes.
    ///
    /// Each query code gets its own run of segments: either a header plus
    /// resource blocks packed under the configured character budget, or the
    /// apology fallback when nothing is in range. Codes the gazetteer does not
    /// know are skipped, so an all-unknown query list yields no segments at
    /// all; an empty query list yields the single apology segment.
    #[instrument(
        name = "Locate Resources",
        level = "info",
        skip_all,
        fields(queries = query_codes.len())
    )]
    pub fn locate<Code>(&self, query_codes: &[Code]) -> Vec<String>
    where
        Code: AsRef<str>,
    {
        if query_codes.is_empty() {
            return vec![message::EMPTY_QUERY_APOLOGY.to_owned()];
        }

        let t_locate = std::time::Instant::now();

        let ranked = self.rank(query_codes);
        let segments = message::batch_segments(&ranked, &self.config);

        info!(
            elapsed = ?t_locate.elapsed(),
            segments = segments.len(),
            "Locate complete"
        );
        segments
    }

    /// Rank nearby resources for the given postal codes without formatting.
    ///
    /// This is the structured counterpart of [`locate`](Self::locate): one
    /// [`RankedResult`] per resolved query code, records nearest first and
    /// truncated to the configured maximum. Useful when replies go somewhere
    /// other than SMS.
    pub fn rank<Code>(&self, query_codes: &[Code]) -> RankedResults
    where
        Code: AsRef<str>,
    {
        let index = self.index.load_full();
        let lookups =
            locate::resolve_lookups(&self.gazetteer, query_codes, self.config.radius_miles);
        locate::rank_nearby(&lookups, &index, self.config.max_per_query)
    }

    /// Replace the resource index wholesale.
    ///
    /// Readers that already loaded a snapshot finish against it; new lookups
    /// see the new index. There is no partial update path, a refresh either
    /// installs a complete index or leaves the old one in place.
    #[instrument(name = "Update Resource Index", level = "info", skip_all)]
    pub fn update_index(&self, new_index: ResourceIndex) {
        info!(
            codes = new_index.code_count(),
            records = new_index.record_count(),
            "Swapping in new resource index"
        );
        self.index.store(Arc::new(new_index));
    }

    /// Get the current resource index snapshot.
    ///
    /// The snapshot stays valid even if [`update_index`](Self::update_index)
    /// runs while you hold it.
    pub fn index_snapshot(&self) -> Arc<ResourceIndex> {
        self.index.load_full()
    }

    /// Get information about the locator's configuration and data.
    pub fn info(&self) -> LocatorInfo {
        let index = self.index.load_full();
        LocatorInfo {
            gazetteer_codes: self.gazetteer.code_count(),
            index_codes: index.code_count(),
            index_records: index.record_count(),
            index_built_at: index.built_at(),
            radius_miles: self.config.radius_miles,
            max_per_query: self.config.max_per_query,
        }
    }

    // === Utility Methods ===

    /// Access the lookup configuration.
    pub fn config(&self) -> &LocateConfig {
        &self.config
    }

    /// Access the underlying `PostalGazetteer` for advanced operations.
    pub fn gazetteer(&self) -> &PostalGazetteer {
        &self.gazetteer
    }
}

/// Create a `ResourceLocator` with the default configuration.
///
/// # Examples
///
/// ```rust
/// use waypost::{PostalGazetteer, ResourceLocator};
/// use waypost::ingest::ResourceIndex;
///
/// let locator = ResourceLocator::from((PostalGazetteer::default(), ResourceIndex::empty()));
/// assert_eq!(locator.config().max_per_query, 4);
/// ```
impl From<(PostalGazetteer, ResourceIndex)> for ResourceLocator {
    fn from((gazetteer, index): (PostalGazetteer, ResourceIndex)) -> Self {
        Self::with_index(gazetteer, index, LocateConfig::default())
    }
}

/// Information about a `ResourceLocator`'s configuration and data.
#[derive(Debug, Clone)]
pub struct LocatorInfo {
    pub gazetteer_codes: usize,
    pub index_codes: usize,
    pub index_records: usize,
    pub index_built_at: DateTime<Utc>,
    pub radius_miles: f64,
    pub max_per_query: usize,
}

impl LocatorInfo {
    /// Get a human-readable summary of the locator.
    pub fn summary(&self) -> String {
        format!(
            "ResourceLocator covering {} postal codes with {} resource records under {} codes",
            self.gazetteer_codes, self.index_records, self.index_codes
        )
    }

    /// Check whether any resources are loaded at all.
    pub fn has_resources(&self) -> bool {
        self.index_records > 0
    }
}

// === Builder Pattern ===

/// Builder for creating a `ResourceLocator` with custom parts.
#[derive(Debug, Clone)]
pub struct ResourceLocatorBuilder {
    gazetteer: PostalGazetteer,
    index: ResourceIndex,
    config: LocateConfig,
}

impl ResourceLocatorBuilder {
    /// Create a new builder around a gazetteer.
    #[must_use]
    pub fn new(gazetteer: PostalGazetteer) -> Self {
        Self {
            gazetteer,
            index: ResourceIndex::empty(),
            config: LocateConfig::default(),
        }
    }

    /// Set the initial resource index.
    #[must_use]
    pub fn index(mut self, index: ResourceIndex) -> Self {
        self.index = index;
        self
    }

    /// Set the lookup configuration.
    #[must_use]
    pub fn config(mut self, config: LocateConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the `ResourceLocator`.
    #[must_use]
    pub fn build(self) -> ResourceLocator {
        ResourceLocator::with_index(self.gazetteer, self.index, self.config)
    }
}
