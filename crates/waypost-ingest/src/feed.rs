//! Resource feed parsing.
//!
//! The upstream feed is a GeoJSON feature collection of point features. Each
//! feature becomes one [`ResourceRecord`]; features missing any required bit
//! (point geometry, identity, name, address, postal code) are skipped with a
//! warning rather than failing the whole snapshot. Property names vary across
//! feed publishers, so each field accepts a few aliases.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    Result,
    records::{RecordIndex, ResourceIndex, ResourceRecord},
};

/// Property keys accepted for each record field, first match wins.
const NAME_KEYS: &[&str] = &["name", "site_name", "facility_name"];
const ADDRESS_KEYS: &[&str] = &["address", "street_address", "location"];
const PHONE_KEYS: &[&str] = &["phone", "phone_number", "telephone"];
const POSTAL_CODE_KEYS: &[&str] = &["zip", "zipcode", "zip_code", "postal_code"];

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<RecordIndex>,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Vec<f64> },
    #[serde(other)]
    Unsupported,
}

/// Parse a GeoJSON feature collection into resource records.
pub fn parse_feed(json: &str) -> Result<Vec<ResourceRecord>> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    let total = collection.features.len();
    let records: Vec<ResourceRecord> = collection
        .features
        .into_iter()
        .filter_map(record_from_feature)
        .collect();
    if records.len() < total {
        warn!(
            parsed = records.len(),
            skipped = total - records.len(),
            "Some feed features were skipped"
        );
    } else {
        debug!(parsed = records.len(), "Parsed feed features");
    }
    Ok(records)
}

/// Parse a feed and build the postal-code index in one step.
pub fn index_from_feed(json: &str) -> Result<ResourceIndex> {
    ResourceIndex::from_records(parse_feed(json)?)
}

fn record_from_feature(feature: Feature) -> Option<ResourceRecord> {
    let Some(Geometry::Point { coordinates }) = feature.geometry else {
        warn!("Skipping feature without point geometry");
        return None;
    };
    if coordinates.len() < 2 {
        warn!("Skipping feature with malformed point coordinates");
        return None;
    }
    let (longitude, latitude) = (coordinates[0], coordinates[1]);

    let Some(index) = feature.id else {
        warn!("Skipping feature without an id");
        return None;
    };
    let properties = feature.properties;
    let Some(name) = string_property(&properties, NAME_KEYS) else {
        warn!(%index, "Skipping feature without a name");
        return None;
    };
    let Some(address) = string_property(&properties, ADDRESS_KEYS) else {
        warn!(%index, "Skipping feature without an address");
        return None;
    };
    let Some(postal_code) = postal_code_property(&properties) else {
        warn!(%index, "Skipping feature without a postal code");
        return None;
    };
    let phone = string_property(&properties, PHONE_KEYS);

    Some(ResourceRecord {
        index,
        name,
        address,
        phone,
        postal_code,
        latitude,
        longitude,
        metadata: properties,
    })
}

/// First non-empty string value under any of the accepted keys.
fn string_property(properties: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match properties.get(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        _ => None,
    })
}

/// Postal code property, zero-padding the bare numeric form some feeds emit.
fn postal_code_property(properties: &Map<String, Value>) -> Option<String> {
    POSTAL_CODE_KEYS.iter().find_map(|key| match properties.get(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Some(Value::Number(number)) => number.as_u64().map(|code| format!("{code:05}")),
        _ => None,
    })
}

#[cfg(feature = "download_data")]
pub use fetch::{fetch_feed, fetch_resource_index};

#[cfg(feature = "download_data")]
mod fetch {
    use tracing::{info, instrument};

    use super::{ResourceIndex, ResourceRecord, Result, parse_feed};

    /// Fetch and parse the feed once. No retry here; a failed refresh cycle
    /// keeps the previous index and the next cycle tries again.
    #[instrument(name = "Fetch resource feed", skip_all, level = "info")]
    pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Vec<ResourceRecord>> {
        info!(url, "Fetching resource feed");
        let body = client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_feed(&body)
    }

    /// Fetch the feed and build a fresh index from it.
    #[instrument(name = "Fetch resource index", skip_all, level = "info")]
    pub async fn fetch_resource_index(
        client: &reqwest::Client,
        url: &str,
    ) -> Result<ResourceIndex> {
        ResourceIndex::from_records(fetch_feed(client, url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IngestError;
    use crate::test_data::{TestDataConfig, sample_feed_json};

    #[test]
    fn test_parse_sample_feed() {
        let records = parse_feed(&sample_feed_json(&TestDataConfig::sample()))
            .expect("fixture feed should parse");
        assert_eq!(records.len(), 6);

        let lexington = records
            .iter()
            .find(|r| r.postal_code == "68850")
            .expect("Lexington record");
        assert_eq!(lexington.index, RecordIndex::Number(101));
        assert_eq!(lexington.name, "Lexington Optimist Recreation Center");
        assert_eq!(lexington.phone.as_deref(), Some("(308) 555-0142"));
        assert!((lexington.latitude - 40.7810).abs() < 1e-9);
        assert!((lexington.longitude - -99.7415).abs() < 1e-9);
        assert_eq!(
            lexington.metadata.get("zip"),
            Some(&serde_json::Value::String("68850".to_string()))
        );
    }

    #[test]
    fn test_missing_phone_is_tolerated() {
        let records = parse_feed(&sample_feed_json(&TestDataConfig::sample())).expect("parse");
        let overton = records
            .iter()
            .find(|r| r.postal_code == "68863")
            .expect("Overton record");
        assert_eq!(overton.phone, None);
    }

    #[test]
    fn test_property_aliases_and_numeric_zip() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "site-9",
                "geometry": { "type": "Point", "coordinates": [-99.7, 40.7] },
                "properties": {
                    "site_name": "East Gym",
                    "street_address": "9 Oak St",
                    "telephone": "555-0000",
                    "zip_code": 6885
                }
            }]
        }"#;
        let records = parse_feed(json).expect("parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index, RecordIndex::Text("site-9".to_string()));
        assert_eq!(records[0].name, "East Gym");
        assert_eq!(records[0].address, "9 Oak St");
        assert_eq!(records[0].phone.as_deref(), Some("555-0000"));
        assert_eq!(records[0].postal_code, "06885");
    }

    #[test]
    fn test_incomplete_features_are_skipped() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": 1,
                    "geometry": { "type": "Point", "coordinates": [-99.7, 40.7] },
                    "properties": { "name": "Keep Me", "address": "1 Main St", "zip": "68850" }
                },
                {
                    "type": "Feature",
                    "id": 2,
                    "geometry": { "type": "Polygon", "coordinates": [] },
                    "properties": { "name": "Not A Point", "address": "2 Main St", "zip": "68850" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-99.7, 40.7] },
                    "properties": { "name": "No Id", "address": "3 Main St", "zip": "68850" }
                },
                {
                    "type": "Feature",
                    "id": 4,
                    "geometry": { "type": "Point", "coordinates": [-99.7, 40.7] },
                    "properties": { "address": "4 Main St", "zip": "68850" }
                },
                {
                    "type": "Feature",
                    "id": 5,
                    "geometry": { "type": "Point", "coordinates": [-99.7, 40.7] },
                    "properties": { "name": "No Zip", "address": "5 Main St" }
                }
            ]
        }"#;
        let records = parse_feed(json).expect("parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Keep Me");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            parse_feed("{ not json"),
            Err(IngestError::FeedJson(_))
        ));
    }

    #[test]
    fn test_index_from_feed_rejects_duplicate_ids() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": 1,
                    "geometry": { "type": "Point", "coordinates": [-99.7, 40.7] },
                    "properties": { "name": "First", "address": "1 Main St", "zip": "68850" }
                },
                {
                    "type": "Feature",
                    "id": 1,
                    "geometry": { "type": "Point", "coordinates": [-92.4, 31.2] },
                    "properties": { "name": "Second", "address": "2 Main St", "zip": "71301" }
                }
            ]
        }"#;
        assert!(matches!(
            index_from_feed(json),
            Err(IngestError::DuplicateRecordIndex(RecordIndex::Number(1)))
        ));
    }

    #[test]
    fn test_index_from_sample_feed() {
        let index =
            index_from_feed(&sample_feed_json(&TestDataConfig::sample())).expect("index builds");
        assert_eq!(index.record_count(), 6);
        assert!(index.contains_code("68850"));
        assert!(index.contains_code("71301"));
        assert!(!index.contains_code("59001"));
    }
}
