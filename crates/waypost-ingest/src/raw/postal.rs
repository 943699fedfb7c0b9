use std::path::Path;

use itertools::Itertools;
use polars::prelude::*;

use super::{PostalRow, Result};

/// GeoNames postal dump layout: 12 tab-separated columns, no header row.
const POSTAL_DUMP_SCHEMA: [(PlSmallStr, DataType); 12] = [
    (PlSmallStr::from_static("country_code"), DataType::String),
    (PlSmallStr::from_static("postal_code"), DataType::String),
    (PlSmallStr::from_static("place_name"), DataType::String),
    (PlSmallStr::from_static("admin1_name"), DataType::String),
    (PlSmallStr::from_static("admin1_code"), DataType::String),
    (PlSmallStr::from_static("admin2_name"), DataType::String),
    (PlSmallStr::from_static("admin2_code"), DataType::String),
    (PlSmallStr::from_static("admin3_name"), DataType::String),
    (PlSmallStr::from_static("admin3_code"), DataType::String),
    (PlSmallStr::from_static("latitude"), DataType::Float64),
    (PlSmallStr::from_static("longitude"), DataType::Float64),
    (PlSmallStr::from_static("accuracy"), DataType::Int32),
];

/// Parse a postal dump into a lazy frame, dropping rows that cannot anchor a
/// coordinate lookup (missing code or centroid).
pub fn get_postal_df(path: impl AsRef<Path>) -> Result<LazyFrame> {
    Ok(LazyCsvReader::new(path)
        .with_separator(b'\t')
        .with_has_header(false)
        .with_schema(Some(Schema::from_iter(POSTAL_DUMP_SCHEMA).into()))
        .finish()?
        .filter(
            (col("postal_code").is_not_null())
                .and(col("latitude").is_not_null())
                .and(col("longitude").is_not_null()),
        ))
}

/// Collect the parsed frame into plain rows, keeping the first row seen for
/// each postal code. The dump lists one row per locality, so a code covering
/// several places appears several times; the first locality names the code.
pub fn postal_rows_from_df(df: &DataFrame) -> Result<Vec<PostalRow>> {
    let country_codes = df.column("country_code")?.str()?;
    let postal_codes = df.column("postal_code")?.str()?;
    let place_names = df.column("place_name")?.str()?;
    let admin1_names = df.column("admin1_name")?.str()?;
    let admin1_codes = df.column("admin1_code")?.str()?;
    let latitudes = df.column("latitude")?.f64()?;
    let longitudes = df.column("longitude")?.f64()?;

    let rows = (0..df.height())
        .filter_map(|i| {
            let country_code = country_codes.get(i)?;
            let postal_code = postal_codes.get(i)?;
            let latitude = latitudes.get(i)?;
            let longitude = longitudes.get(i)?;
            Some(PostalRow {
                country_code: country_code.to_owned(),
                postal_code: postal_code.to_owned(),
                place_name: place_names.get(i).unwrap_or_default().to_owned(),
                admin1_name: admin1_names.get(i).map(str::to_owned),
                admin1_code: admin1_codes.get(i).map(str::to_owned),
                latitude,
                longitude,
            })
        })
        .unique_by(|row| row.postal_code.clone())
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::test_data::{TestDataConfig, create_postal_test_data};

    #[test]
    fn test_parse_fixture_dump() {
        let file = create_postal_test_data(&TestDataConfig::sample()).expect("fixture file");
        let df = get_postal_df(file.path())
            .expect("fixture should parse")
            .collect()
            .expect("fixture should collect");
        assert_eq!(df.height(), 9);

        let rows = postal_rows_from_df(&df).expect("rows should extract");
        assert_eq!(rows.len(), 9);

        let lexington = rows
            .iter()
            .find(|row| row.postal_code == "68850")
            .expect("Lexington row");
        assert_eq!(lexington.country_code, "US");
        assert_eq!(lexington.place_name, "Lexington");
        assert_eq!(lexington.admin1_name.as_deref(), Some("Nebraska"));
        assert_eq!(lexington.admin1_code.as_deref(), Some("NE"));
        assert!((lexington.latitude - 40.7810).abs() < 1e-9);
        assert!((lexington.longitude - -99.7415).abs() < 1e-9);
    }

    #[test]
    fn test_first_row_wins_per_postal_code() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "US\t68850\tLexington\tNebraska\tNE\tDawson\t047\t\t\t40.781\t-99.7415\t4"
        )
        .expect("write row");
        writeln!(
            file,
            "US\t68850\tLexington Rural\tNebraska\tNE\tDawson\t047\t\t\t40.9\t-99.9\t4"
        )
        .expect("write row");
        file.flush().expect("flush");

        let df = get_postal_df(file.path())
            .expect("parse")
            .collect()
            .expect("collect");
        let rows = postal_rows_from_df(&df).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].place_name, "Lexington");
        assert!((rows[0].latitude - 40.781).abs() < 1e-9);
    }

    #[test]
    fn test_rows_without_coordinates_are_dropped() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "US\t68850\tLexington\tNebraska\tNE\tDawson\t047\t\t\t40.781\t-99.7415\t4"
        )
        .expect("write row");
        writeln!(file, "US\t99999\tNowhere\tNebraska\tNE\t\t\t\t\t\t\t").expect("write row");
        file.flush().expect("flush");

        let df = get_postal_df(file.path())
            .expect("parse")
            .collect()
            .expect("collect");
        let rows = postal_rows_from_df(&df).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].postal_code, "68850");
    }
}
