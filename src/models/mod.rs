//! Data models for the region latency stats service

pub mod config;
pub mod telemetry;

pub use config::Config;
pub use telemetry::{
    ErrorResponse, RegionStats, StatsQuery, StatsResponse, StatusMessage, TelemetryRecord,
    TelemetryTable,
};
