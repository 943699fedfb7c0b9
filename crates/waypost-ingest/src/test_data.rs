//! Deterministic fixtures so tests and examples run without the real
//! datasets.
//!
//! Two small clusters of real US postal codes plus far-away controls:
//!
//! - Nebraska: 68850 Lexington, 68863 Overton (~11 mi away), 68847 Kearney
//!   (~35 mi away).
//! - Louisiana: 71301 Alexandria, 71303 West Alexandria (~4 mi), 71360
//!   Pineville (~6 mi), 71405 Ball (~11 mi).
//! - Controls far from both: 10001 New York NY, 59001 Absarokee MT (no
//!   resources anywhere near it).
//!
//! The gazetteer fixture is written in the GeoNames postal dump format (12
//! tab-separated columns, no header); the resource feed fixture is a GeoJSON
//! feature collection like the one the live feed serves.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::{Result, raw::PostalRow};

/// Configuration for generating fixture data.
#[derive(Debug, Clone)]
pub struct TestDataConfig {
    /// Include the neighborhood postal codes around each scenario code
    pub with_neighbors: bool,
    /// Include codes and records far away from the scenario clusters
    pub with_outliers: bool,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self::sample()
    }
}

impl TestDataConfig {
    /// Just the two scenario codes and their own records.
    pub fn minimal() -> Self {
        Self {
            with_neighbors: false,
            with_outliers: false,
        }
    }

    /// The full fixture geography.
    pub fn sample() -> Self {
        Self {
            with_neighbors: true,
            with_outliers: true,
        }
    }
}

// (postal_code, place_name, admin1_name, admin1_code, admin2_name, admin2_code,
//  latitude, longitude)
type FixtureRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    f64,
    f64,
);

const CORE_ROWS: [FixtureRow; 2] = [
    ("68850", "Lexington", "Nebraska", "NE", "Dawson", "047", 40.7810, -99.7415),
    ("71301", "Alexandria", "Louisiana", "LA", "Rapides", "079", 31.2602, -92.4632),
];

const NEIGHBOR_ROWS: [FixtureRow; 5] = [
    ("68863", "Overton", "Nebraska", "NE", "Dawson", "047", 40.7403, -99.5373),
    ("68847", "Kearney", "Nebraska", "NE", "Buffalo", "019", 40.7394, -99.0701),
    ("71303", "Alexandria", "Louisiana", "LA", "Rapides", "079", 31.2762, -92.5313),
    ("71360", "Pineville", "Louisiana", "LA", "Rapides", "079", 31.3352, -92.4174),
    ("71405", "Ball", "Louisiana", "LA", "Rapides", "079", 31.4177, -92.4115),
];

const OUTLIER_ROWS: [FixtureRow; 2] = [
    ("10001", "New York", "New York", "NY", "New York", "061", 40.7506, -73.9972),
    ("59001", "Absarokee", "Montana", "MT", "Stillwater", "095", 45.5216, -109.4432),
];

fn selected_rows(config: &TestDataConfig) -> Vec<FixtureRow> {
    let mut rows = CORE_ROWS.to_vec();
    if config.with_neighbors {
        rows.extend_from_slice(&NEIGHBOR_ROWS);
    }
    if config.with_outliers {
        rows.extend_from_slice(&OUTLIER_ROWS);
    }
    rows
}

/// Fixture gazetteer rows as structs, for building a gazetteer without a
/// round trip through the TSV parser.
pub fn postal_fixture_rows(config: &TestDataConfig) -> Vec<PostalRow> {
    selected_rows(config)
        .into_iter()
        .map(
            |(postal_code, place_name, admin1_name, admin1_code, _, _, latitude, longitude)| {
                PostalRow {
                    country_code: "US".to_string(),
                    postal_code: postal_code.to_string(),
                    place_name: place_name.to_string(),
                    admin1_name: Some(admin1_name.to_string()),
                    admin1_code: Some(admin1_code.to_string()),
                    latitude,
                    longitude,
                }
            },
        )
        .collect()
}

/// Write the fixture gazetteer as a GeoNames-format postal dump.
pub fn create_postal_test_data(config: &TestDataConfig) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    for (postal_code, place_name, admin1_name, admin1_code, admin2_name, admin2_code, lat, lon) in
        selected_rows(config)
    {
        writeln!(
            file,
            "US\t{postal_code}\t{place_name}\t{admin1_name}\t{admin1_code}\t{admin2_name}\t{admin2_code}\t\t\t{lat}\t{lon}\t4"
        )?;
    }
    file.flush()?;
    Ok(file)
}

fn feature(
    id: u64,
    name: &str,
    address: &str,
    phone: Option<&str>,
    zip: &str,
    latitude: f64,
    longitude: f64,
) -> serde_json::Value {
    let mut properties = serde_json::json!({
        "name": name,
        "address": address,
        "zip": zip,
    });
    if let Some(phone) = phone {
        properties["phone"] = serde_json::Value::String(phone.to_string());
    }
    serde_json::json!({
        "type": "Feature",
        "id": id,
        "geometry": { "type": "Point", "coordinates": [longitude, latitude] },
        "properties": properties,
    })
}

/// The resource feed fixture as a GeoJSON feature collection string.
pub fn sample_feed_json(config: &TestDataConfig) -> String {
    let mut features = vec![
        feature(
            101,
            "Lexington Optimist Recreation Center",
            "1500 Plum Creek Pkwy, Lexington, NE 68850",
            Some("(308) 555-0142"),
            "68850",
            40.7810,
            -99.7415,
        ),
        feature(
            103,
            "Alexandria Riverfront Center",
            "707 Second St, Alexandria, LA 71301",
            Some("(318) 555-0178"),
            "71301",
            31.2602,
            -92.4632,
        ),
    ];
    if config.with_neighbors {
        features.push(feature(
            102,
            "Overton Community Hall",
            "205 Francis St, Overton, NE 68863",
            None,
            "68863",
            40.7403,
            -99.5373,
        ));
        features.push(feature(
            104,
            "Kees Park Community Center",
            "2450 Highway 28 E, Pineville, LA 71360",
            Some("(318) 555-0123"),
            "71360",
            31.3352,
            -92.4174,
        ));
        features.push(feature(
            105,
            "Kearney Fairgrounds Shelter",
            "3807 Avenue N, Kearney, NE 68847",
            Some("(308) 555-0114"),
            "68847",
            40.7394,
            -99.0701,
        ));
    }
    if config.with_outliers {
        features.push(feature(
            106,
            "Midtown Distribution Point",
            "250 W 26th St, New York, NY 10001",
            None,
            "10001",
            40.7506,
            -73.9972,
        ));
    }
    serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
    })
    .to_string()
}
