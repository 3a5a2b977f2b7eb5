//! Telemetry dataset loading
//!
//! The dataset is read once at startup. A missing or malformed file does not
//! stop the service: the failure is logged and the table stays empty, which
//! puts every statistics request into the data-unavailable state.

use crate::error::{AppError, Result};
use crate::logging::{ErrorEventLogger, Logger};
use crate::models::{TelemetryRecord, TelemetryTable};
use std::path::Path;

/// Read and parse the telemetry file at `path`
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<TelemetryTable> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read telemetry file '{}': {}", path.display(), e)))?;
    parse_table(&contents)
        .map_err(|e| AppError::parse(format!("Invalid telemetry file '{}': {}", path.display(), e)))
}

/// Parse a JSON array of telemetry records
pub fn parse_table(contents: &str) -> std::result::Result<TelemetryTable, serde_json::Error> {
    let records: Vec<TelemetryRecord> = serde_json::from_str(contents)?;
    Ok(TelemetryTable::new(records))
}

/// Load the table, falling back to an empty one on any failure
pub async fn load_or_empty<P: AsRef<Path>>(path: P, logger: &Logger) -> TelemetryTable {
    let path = path.as_ref();
    match load_table(path) {
        Ok(table) => {
            let region_count = table.regions().len();
            if table.is_empty() {
                logger.warn(&format!("Telemetry file '{}' contains no records", path.display()))
                    .field("path", path.display().to_string())
                    .log()
                    .await;
            } else {
                logger.info(&format!(
                    "Loaded {} telemetry records across {} regions",
                    table.len(),
                    region_count
                ))
                    .field("path", path.display().to_string())
                    .field("records", table.len())
                    .field("regions", region_count)
                    .log()
                    .await;
            }
            table
        }
        Err(error) => {
            ErrorEventLogger::from_logger(logger.clone())
                .log_error(&error, Some("Error loading data file"), None)
                .await;
            TelemetryTable::empty()
        }
    }
}
