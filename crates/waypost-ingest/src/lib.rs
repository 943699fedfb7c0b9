//! Data ingestion for the waypost locator.
//!
//! Two inputs feed the locator: the GeoNames postal-code gazetteer (static,
//! fetched once and cached on disk) and the resource feed (GeoJSON, refreshed
//! periodically while the service runs). This crate turns both into plain
//! Rust values; ranking and reply rendering live in the `waypost` crate.

use once_cell::sync::Lazy;
use std::path::PathBuf;
use tracing::warn;

pub mod feed;
pub mod raw;
pub mod records;
#[cfg(feature = "download_data")]
pub mod refresh;
pub mod test_data;

static TEST_DATA_DIR: Lazy<tempfile::TempDir> = Lazy::new(|| {
    tempfile::TempDir::new().expect("Failed to create global temporary test data directory")
});

pub const DATA_DIR_DEFAULT: &str = "./waypost_data";

/// Whether loaders should serve the bundled fixtures instead of real data.
pub fn should_use_test_data() -> bool {
    let is_test_environment = cfg!(test) || cfg!(doctest);

    let explicit_test_data = std::env::var("USE_TEST_DATA")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    is_test_environment || explicit_test_data
}

/// Fixture size to use, controlled by the `TEST_DATA_SIZE` variable.
pub fn get_test_data_config() -> test_data::TestDataConfig {
    match std::env::var("TEST_DATA_SIZE").as_deref() {
        Ok("minimal") => test_data::TestDataConfig::minimal(),
        _ => test_data::TestDataConfig::sample(),
    }
}

/// Where downloaded dumps are cached, resolved once per process.
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    if should_use_test_data() {
        let temp_dir = TEST_DATA_DIR.path().to_path_buf();
        warn!(temp_dir = ?temp_dir, "Using temporary data directory for tests");
        return temp_dir;
    }
    if let Ok(dir) = std::env::var("DATA_DIR") {
        return PathBuf::from(dir);
    }
    #[cfg(feature = "system-dirs")]
    if let Some(project_dirs) = directories::ProjectDirs::from("", "", "waypost") {
        return project_dirs.cache_dir().to_path_buf();
    }
    PathBuf::from(DATA_DIR_DEFAULT)
});

/// Directory where raw gazetteer dumps are cached between runs.
pub fn get_data_dir() -> PathBuf {
    DATA_DIR.clone()
}

mod error {
    use polars::prelude::PolarsError;
    use thiserror::Error;

    use crate::records::RecordIndex;

    #[derive(Error, Debug)]
    pub enum IngestError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[error("Polars error: {0}")]
        Polars(#[from] PolarsError),
        #[error("Resource feed is not valid JSON: {0}")]
        FeedJson(#[from] serde_json::Error),
        #[error("Duplicate record identity in feed: {0}")]
        DuplicateRecordIndex(RecordIndex),
        #[cfg(feature = "download_data")]
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),
        #[cfg(feature = "download_data")]
        #[error("Join error: {0}")]
        JoinError(#[from] tokio::task::JoinError),
        #[cfg(feature = "download_data")]
        #[error("Zip error: {0}")]
        ZipError(#[from] zip::result::ZipError),
        #[error("Unknown postal data source: {0}")]
        UnknownSource(String),
        #[error("Required data files not found in the data directory")]
        RequiredFilesNotFound,
    }

    pub type Result<T> = std::result::Result<T, IngestError>;
}

pub use error::{IngestError, Result};

// Re-export main types
pub use feed::{index_from_feed, parse_feed};
pub use raw::{PostalRow, PostalSource, get_postal_data, load_postal_rows};
pub use records::{RecordIndex, ResourceIndex, ResourceRecord};
#[cfg(feature = "download_data")]
pub use refresh::FeedRefresher;
pub use test_data::TestDataConfig;
