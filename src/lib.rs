//! Region Latency Stats
//!
//! A small HTTP service that loads a static telemetry dataset once at startup
//! and answers per-region latency and uptime statistics: mean latency,
//! 95th-percentile latency, mean uptime and the number of threshold breaches.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod stats;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, RegionStats, StatsQuery, StatsResponse, TelemetryRecord, TelemetryTable};
pub use stats::{compute, StatsEngine};
pub use server::{create_router, AppState};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata injected by `build.rs`
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// One-line build description used in startup logs and `--version` output
pub fn build_info() -> String {
    format!(
        "{} v{} ({} {}, built {})",
        PKG_NAME, VERSION, GIT_COMMIT, TARGET_TRIPLE, BUILD_TIME
    )
}

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 8000;
    pub const DEFAULT_DATA_FILE: &str = "q-vercel-latency.json";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const MAX_WORKER_THREADS: usize = 512;

    /// Percentile reported as `p95_latency`
    pub const LATENCY_PERCENTILE: f64 = 95.0;

    /// Decimal places kept in the response
    pub const LATENCY_DECIMALS: usize = 2;
    pub const UPTIME_DECIMALS: usize = 3;

    /// Error payload returned while the telemetry table is empty
    pub const MISSING_DATA_MESSAGE: &str = "Server is missing the telemetry data file.";
    /// Payload of `GET /`
    pub const RUNNING_MESSAGE: &str = "API is running. Use a POST request to get statistics.";

    /// Default worker count for the request runtime
    pub fn default_worker_threads() -> usize {
        num_cpus::get().max(1)
    }
}
