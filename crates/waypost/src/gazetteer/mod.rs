//! Postal code gazetteer: centroid coordinates and radius neighborhoods.
//!
//! Built once from GeoNames postal rows, then queried per request. A radius
//! set is computed with a bounding-box prefilter over the whole table followed
//! by an exact geodesic check on the survivors, so every downstream "is this
//! nearby" decision shares one postal-code-level notion of proximity.

use std::collections::BTreeMap;

use geo::{Distance, Geodesic, Point};
use tracing::info;
use waypost_ingest::PostalRow;

pub use error::GazetteerError;
use error::Result;

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// Meters per degree of latitude, at its smallest. Using the minimum keeps
/// the prefilter box a superset of the true disc.
const METERS_PER_DEGREE_LAT: f64 = 110_574.0;
/// Meters per degree of longitude at the equator.
const METERS_PER_DEGREE_LON: f64 = 111_320.0;

/// A WGS84 point, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Ellipsoidal geodesic distance to `other`, in meters.
    pub fn distance_meters(self, other: Self) -> f64 {
        Geodesic.distance(
            Point::new(self.longitude, self.latitude),
            Point::new(other.longitude, other.latitude),
        )
    }
}

/// A resolved query postal code: its centroid and the codes within radius.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PostalLookup {
    pub postal_code: String,
    pub coordinate: Coordinate,
    /// Sorted; always contains `postal_code` itself.
    radius_set: Vec<String>,
}

impl PostalLookup {
    pub fn radius_set(&self) -> &[String] {
        &self.radius_set
    }

    /// Whether `code` falls inside this query's radius.
    pub fn contains(&self, code: &str) -> bool {
        self.radius_set
            .binary_search_by(|probe| probe.as_str().cmp(code))
            .is_ok()
    }
}

/// Postal code to centroid table with radius queries.
#[derive(Debug, Clone, Default)]
pub struct PostalGazetteer {
    entries: BTreeMap<String, Coordinate>,
}

impl PostalGazetteer {
    /// Build the gazetteer from postal dump rows. The first row seen for a
    /// code wins; later rows for the same code are dropped.
    pub fn from_rows(rows: impl IntoIterator<Item = PostalRow>) -> Self {
        let mut entries = BTreeMap::new();
        for row in rows {
            entries
                .entry(row.postal_code)
                .or_insert(Coordinate::new(row.latitude, row.longitude));
        }
        info!(codes = entries.len(), "Postal gazetteer built");
        Self { entries }
    }

    /// Centroid coordinate for `postal_code`.
    pub fn resolve(&self, postal_code: &str) -> Result<Coordinate> {
        self.entries
            .get(postal_code)
            .copied()
            .ok_or_else(|| GazetteerError::UnknownPostalCode(postal_code.to_string()))
    }

    /// All known codes within `radius_miles` of `postal_code`, sorted,
    /// including `postal_code` itself. The comparison is inclusive, so a code
    /// exactly on the radius boundary is in, and a zero radius yields just the
    /// query code.
    pub fn radius_set(&self, postal_code: &str, radius_miles: f64) -> Result<Vec<String>> {
        self.lookup(postal_code, radius_miles)
            .map(|lookup| lookup.radius_set)
    }

    /// Resolve `postal_code` and compute its radius set in one pass.
    pub fn lookup(&self, postal_code: &str, radius_miles: f64) -> Result<PostalLookup> {
        let coordinate = self.resolve(postal_code)?;
        let radius_set = self.codes_within(coordinate, radius_miles);
        Ok(PostalLookup {
            postal_code: postal_code.to_string(),
            coordinate,
            radius_set,
        })
    }

    pub fn contains(&self, postal_code: &str) -> bool {
        self.entries.contains_key(postal_code)
    }

    pub fn code_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn codes_within(&self, center: Coordinate, radius_miles: f64) -> Vec<String> {
        let radius_meters = radius_miles * METERS_PER_MILE;
        let bounds = BoundingBox::around(center, radius_meters);
        self.entries
            .iter()
            .filter(|(_, coordinate)| bounds.contains(**coordinate))
            .filter(|(_, coordinate)| center.distance_meters(**coordinate) <= radius_meters)
            .map(|(code, _)| code.clone())
            .collect()
    }
}

/// Degree-space box that is a superset of the geodesic disc; the exact
/// distance check trims the corners.
#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl BoundingBox {
    fn around(center: Coordinate, radius_meters: f64) -> Self {
        let lat_delta = radius_meters / METERS_PER_DEGREE_LAT;
        let min_lat = (center.latitude - lat_delta).max(-90.0);
        let max_lat = (center.latitude + lat_delta).min(90.0);

        let lon_scale = center.latitude.to_radians().cos();
        let lon_delta = if lon_scale > 0.0 {
            radius_meters / (METERS_PER_DEGREE_LON * lon_scale)
        } else {
            180.0
        };
        // Near the poles or the antimeridian the box degenerates to the full
        // longitude range rather than trying to wrap.
        let (min_lon, max_lon) = if lon_delta >= 180.0
            || center.longitude - lon_delta < -180.0
            || center.longitude + lon_delta > 180.0
        {
            (-180.0, 180.0)
        } else {
            (center.longitude - lon_delta, center.longitude + lon_delta)
        };

        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.latitude >= self.min_lat
            && coordinate.latitude <= self.max_lat
            && coordinate.longitude >= self.min_lon
            && coordinate.longitude <= self.max_lon
    }
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum GazetteerError {
        #[error("Unknown postal code: {0}")]
        UnknownPostalCode(String),
    }

    pub type Result<T> = std::result::Result<T, GazetteerError>;
}
