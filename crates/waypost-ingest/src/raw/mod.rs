use std::{fmt, fs, path::Path, str::FromStr};

use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

use crate::{IngestError, Result, test_data};

#[cfg(feature = "download_data")]
mod fetch;
mod postal;

const GEONAMES_POSTAL_BASE: &str = "https://download.geonames.org/export/zip";

/// Which GeoNames postal dump backs the gazetteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PostalSource {
    /// `US.zip`, around 41k ZIP codes.
    #[default]
    UnitedStates,
    /// `allCountries.zip`, every country GeoNames carries postal data for.
    AllCountries,
    /// Bundled fixture rows, no disk or network access.
    TestData,
}

impl PostalSource {
    /// Download URL for the dump, `None` for the fixture source.
    pub fn geonames_url(&self) -> Option<String> {
        match self {
            Self::UnitedStates => Some(format!("{GEONAMES_POSTAL_BASE}/US.zip")),
            Self::AllCountries => Some(format!("{GEONAMES_POSTAL_BASE}/allCountries.zip")),
            Self::TestData => None,
        }
    }

    /// Name of the data entry inside the zip, also the cached file name under
    /// the raw data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::UnitedStates => "US.txt",
            Self::AllCountries => "allCountries.txt",
            Self::TestData => "postal_test_data.txt",
        }
    }
}

impl fmt::Display for PostalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnitedStates => "us",
            Self::AllCountries => "all_countries",
            Self::TestData => "test_data",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PostalSource {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "us" => Ok(Self::UnitedStates),
            "all_countries" => Ok(Self::AllCountries),
            "test_data" => Ok(Self::TestData),
            unknown => Err(IngestError::UnknownSource(unknown.to_string())),
        }
    }
}

/// One usable row of the postal dump: a code, the place it names, and the
/// centroid coordinate the locator measures from.
#[derive(Debug, Clone, PartialEq)]
pub struct PostalRow {
    pub country_code: String,
    pub postal_code: String,
    pub place_name: String,
    pub admin1_name: Option<String>,
    pub admin1_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Get the postal dump for `source` as a temp file, checking the data
/// directory before reaching for the network.
///
/// Resolution order:
/// 1. Fixture rows when `source` is [`PostalSource::TestData`] or the process
///    is running under test.
/// 2. A previously downloaded dump under `<data_dir>/raw/`.
/// 3. A fresh download, when the `download_data` feature is enabled.
#[instrument(name = "Get postal data", skip_all, level = "info")]
pub fn get_postal_data(source: &PostalSource) -> Result<NamedTempFile> {
    if matches!(source, PostalSource::TestData) || crate::should_use_test_data() {
        info!("Using fixture postal data");
        return test_data::create_postal_test_data(&crate::get_test_data_config());
    }

    let dump_path = crate::get_data_dir().join("raw").join(source.file_name());
    info!("Checking for postal dump at: {}", dump_path.display());

    if dump_path.exists() {
        info!("Found existing postal dump, copying to a temp file");
        return copy_to_temp(&dump_path);
    }

    warn!("Postal dump not found on disk");

    #[cfg(feature = "download_data")]
    {
        info!("Downloading postal dump from GeoNames");
        fetch::download_postal_data(source)
    }

    #[cfg(not(feature = "download_data"))]
    {
        warn!("Postal dump for {source} is missing and the download_data feature is disabled");
        Err(IngestError::RequiredFilesNotFound)
    }
}

/// Load the postal dump for `source` and parse it into deduplicated rows.
#[instrument(name = "Load postal rows", skip_all, level = "info", fields(source = %source))]
pub fn load_postal_rows(source: &PostalSource) -> Result<Vec<PostalRow>> {
    let dump = get_postal_data(source)?;
    let df = postal::get_postal_df(dump.path())?.collect()?;
    let rows = postal::postal_rows_from_df(&df)?;
    info!(rows = rows.len(), "Postal rows loaded");
    Ok(rows)
}

fn copy_to_temp(path: &Path) -> Result<NamedTempFile> {
    let temp_file = NamedTempFile::with_suffix(".txt")?;
    fs::copy(path, temp_file.path())?;
    Ok(temp_file)
}
