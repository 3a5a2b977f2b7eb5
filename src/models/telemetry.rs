//! Telemetry dataset and request/response models

use crate::error::{AppError, Result};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One row of the telemetry dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Region identifier the sample belongs to
    pub region: String,
    /// Observed latency in milliseconds
    pub latency_ms: f64,
    /// Observed uptime percentage
    pub uptime_pct: f64,
}

impl TelemetryRecord {
    /// Create a new telemetry record
    pub fn new<S: Into<String>>(region: S, latency_ms: f64, uptime_pct: f64) -> Self {
        Self {
            region: region.into(),
            latency_ms,
            uptime_pct,
        }
    }
}

/// Ordered, read-only collection of telemetry records
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryTable {
    records: Vec<TelemetryRecord>,
}

impl TelemetryTable {
    /// Create a table from records, keeping their order
    pub fn new(records: Vec<TelemetryRecord>) -> Self {
        Self { records }
    }

    /// An empty table, used when the dataset could not be loaded
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in load order
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Records whose region matches `region` exactly, in load order
    pub fn region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a TelemetryRecord> + 'a {
        self.records.iter().filter(move |record| record.region == region)
    }

    /// Distinct region names in order of first appearance
    pub fn regions(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| record.region.as_str())
            .filter(|region| seen.insert(*region))
            .collect()
    }
}

impl From<Vec<TelemetryRecord>> for TelemetryTable {
    fn from(records: Vec<TelemetryRecord>) -> Self {
        Self::new(records)
    }
}

/// Body of `POST /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsQuery {
    /// Regions to report on, in the order they should appear in the response
    pub regions: Vec<String>,
    /// Latency above which a sample counts as a breach
    #[serde(deserialize_with = "whole_millis")]
    pub threshold_ms: i64,
}

/// Accept a JSON integer, or a float with no fractional part that fits in `i64`
fn whole_millis<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct WholeMillis;

    impl de::Visitor<'_> for WholeMillis {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer number of milliseconds")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<i64, E> {
            i64::try_from(value).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<i64, E> {
            // 2^63 is exactly representable; i64::MAX as f64 rounds up to it
            let in_range = value >= i64::MIN as f64 && value < 9_223_372_036_854_775_808.0;
            if value.is_finite() && value.fract() == 0.0 && in_range {
                Ok(value as i64)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(value), &self))
            }
        }
    }

    deserializer.deserialize_any(WholeMillis)
}

impl StatsQuery {
    /// Create a new query
    pub fn new<I, S>(regions: I, threshold_ms: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
            threshold_ms,
        }
    }

    /// Check the constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(AppError::validation("regions must contain at least one region"));
        }
        Ok(())
    }
}

/// Aggregated statistics for a single region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub region: String,
    /// Mean latency, 2 decimals
    pub avg_latency: f64,
    /// 95th-percentile latency, 2 decimals
    pub p95_latency: f64,
    /// Mean uptime percentage, 3 decimals
    pub avg_uptime: f64,
    /// Samples with latency strictly above the threshold
    pub breaches: u64,
}

/// Successful response of `POST /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub regions: Vec<RegionStats>,
}

/// Error payload shared by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Payload of `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TelemetryTable {
        TelemetryTable::new(vec![
            TelemetryRecord::new("us-east", 100.0, 99.9),
            TelemetryRecord::new("eu-west", 120.0, 98.0),
            TelemetryRecord::new("us-east", 200.0, 99.5),
        ])
    }

    #[test]
    fn test_table_basics() {
        let table = sample_table();
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert!(TelemetryTable::empty().is_empty());
    }

    #[test]
    fn test_region_filter_keeps_order() {
        let table = sample_table();
        let latencies: Vec<f64> = table.region("us-east").map(|r| r.latency_ms).collect();
        assert_eq!(latencies, vec![100.0, 200.0]);
        assert_eq!(table.region("mars").count(), 0);
    }

    #[test]
    fn test_region_filter_is_exact() {
        let table = sample_table();
        assert_eq!(table.region("US-EAST").count(), 0);
        assert_eq!(table.region("us-east ").count(), 0);
    }

    #[test]
    fn test_distinct_regions() {
        assert_eq!(sample_table().regions(), vec!["us-east", "eu-west"]);
    }

    #[test]
    fn test_record_deserialization_ignores_extra_fields() {
        let json = r#"{"region":"apac","service":"checkout","latency_ms":150,"uptime_pct":99.1,"timestamp":20250301}"#;
        let record: TelemetryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, TelemetryRecord::new("apac", 150.0, 99.1));
    }

    #[test]
    fn test_query_deserialization() {
        let query: StatsQuery =
            serde_json::from_str(r#"{"regions":["apac","emea"],"threshold_ms":180}"#).unwrap();
        assert_eq!(query, StatsQuery::new(["apac", "emea"], 180));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_query_rejects_bad_shapes() {
        assert!(serde_json::from_str::<StatsQuery>(r#"{"regions":["apac"]}"#).is_err());
        assert!(serde_json::from_str::<StatsQuery>(r#"{"threshold_ms":180}"#).is_err());
        assert!(serde_json::from_str::<StatsQuery>(r#"{"regions":"apac","threshold_ms":180}"#).is_err());
        assert!(serde_json::from_str::<StatsQuery>(r#"{"regions":["apac"],"threshold_ms":"fast"}"#).is_err());
        assert!(serde_json::from_str::<StatsQuery>(r#"{"regions":[1],"threshold_ms":180}"#).is_err());
    }

    #[test]
    fn test_query_threshold_accepts_whole_floats() {
        let query: StatsQuery =
            serde_json::from_str(r#"{"regions":["apac"],"threshold_ms":150.0}"#).unwrap();
        assert_eq!(query.threshold_ms, 150);

        let query: StatsQuery =
            serde_json::from_str(r#"{"regions":["apac"],"threshold_ms":-20.0}"#).unwrap();
        assert_eq!(query.threshold_ms, -20);
    }

    #[test]
    fn test_query_threshold_rejects_fractions_and_overflow() {
        let cases = [
            r#"{"regions":["apac"],"threshold_ms":150.5}"#,
            r#"{"regions":["apac"],"threshold_ms":1e300}"#,
            r#"{"regions":["apac"],"threshold_ms":9223372036854775808}"#,
            r#"{"regions":["apac"],"threshold_ms":true}"#,
            r#"{"regions":["apac"],"threshold_ms":null}"#,
        ];
        for case in cases {
            assert!(serde_json::from_str::<StatsQuery>(case).is_err(), "accepted {}", case);
        }
    }

    #[test]
    fn test_query_rejects_empty_regions() {
        let query = StatsQuery::new(Vec::<String>::new(), 180);
        let err = query.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_region_stats_serialization() {
        let stats = RegionStats {
            region: "us-east".to_string(),
            avg_latency: 150.0,
            p95_latency: 195.0,
            avg_uptime: 99.7,
            breaches: 1,
        };
        let value = serde_json::to_value(StatsResponse { regions: vec![stats] }).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"regions":[{"region":"us-east","avg_latency":150.0,"p95_latency":195.0,"avg_uptime":99.7,"breaches":1}]})
        );
    }
}
