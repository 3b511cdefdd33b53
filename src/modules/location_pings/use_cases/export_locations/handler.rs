// CSV export of location pings: one header row, then one row per ping.
// Fields containing commas, quotes or newlines are quoted.

use crate::modules::location_pings::core::ping::LocationPing;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("could not finish the export: {0}")]
    Finish(String),
}

#[derive(Serialize)]
struct PingRecord<'a> {
    id: &'a str,
    user_id: &'a str,
    latitude: f64,
    longitude: f64,
    accuracy: Option<f64>,
    battery_level: Option<i64>,
    address: Option<&'a str>,
    created_at: Option<String>,
}

impl<'a> From<&'a LocationPing> for PingRecord<'a> {
    fn from(ping: &'a LocationPing) -> Self {
        Self {
            id: ping.id.as_str(),
            user_id: &ping.user_id,
            latitude: ping.latitude,
            longitude: ping.longitude,
            accuracy: ping.accuracy,
            battery_level: ping.battery_level,
            address: ping.address.as_deref(),
            created_at: ping.created_at.map(|at| at.to_rfc3339()),
        }
    }
}

pub const HEADER: [&str; 8] = [
    "id",
    "user_id",
    "latitude",
    "longitude",
    "accuracy",
    "battery_level",
    "address",
    "created_at",
];

pub fn export_csv(pings: &[LocationPing]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    // Written explicitly so an empty export still carries the header.
    writer.write_record(HEADER)?;
    for ping in pings {
        writer.serialize(PingRecord::from(ping))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|error| ExportError::Finish(error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| ExportError::Finish(error.to_string()))
}

#[cfg(test)]
mod export_locations_tests {
    use super::*;
    use crate::shared::core::row::RecordId;
    use chrono::TimeZone;
    use chrono::Utc;
    use rstest::rstest;

    fn ping(address: Option<&str>) -> LocationPing {
        LocationPing {
            id: RecordId::from("p-1"),
            user_id: "u-1".into(),
            latitude: 52.37,
            longitude: 4.89,
            accuracy: Some(5.0),
            battery_level: None,
            address: address.map(str::to_string),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }

    #[rstest]
    fn it_should_write_only_the_header_for_no_pings() {
        assert_eq!(
            export_csv(&[]).unwrap(),
            "id,user_id,latitude,longitude,accuracy,battery_level,address,created_at\n"
        );
    }

    #[rstest]
    fn it_should_write_one_row_per_ping() {
        let csv = export_csv(&[ping(None), ping(None)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "p-1,u-1,52.37,4.89,5.0,,,2024-05-01T12:00:00+00:00");
    }

    #[rstest]
    fn it_should_quote_addresses_with_commas_and_quotes() {
        let csv = export_csv(&[ping(Some("Dam 1, Amsterdam \"centre\""))]).unwrap();
        assert!(csv.contains(r#","Dam 1, Amsterdam ""centre""","#));
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[6], "Dam 1, Amsterdam \"centre\"");
    }
}
