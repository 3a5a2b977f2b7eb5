//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

/// Region Latency Stats - per-region latency and uptime statistics over HTTP
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "latency-stats")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to bind the HTTP listener to
    #[arg(long = "bind", value_name = "ADDRESS")]
    pub bind_address: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path of the telemetry JSON file
    #[arg(short, long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Worker threads for request handling
    #[arg(long = "workers", value_name = "COUNT")]
    pub worker_threads: Option<usize>,

    /// Minimum log level (trace, debug, info, warn, error, fatal)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log format (console, json, compact)
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Load the telemetry file, print a summary and exit
    #[arg(long)]
    pub check_data: bool,

    /// Print the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if let Some(port) = self.port {
            if port == 0 {
                return Err("--port must be greater than 0".to_string());
            }
        }

        if let Some(workers) = self.worker_threads {
            if workers == 0 {
                return Err("--workers must be greater than 0".to_string());
            }
        }

        if let Some(ref path) = self.data_file {
            if path.as_os_str().is_empty() {
                return Err("--data-file cannot be empty".to_string());
            }
        }

        Ok(())
    }
}
