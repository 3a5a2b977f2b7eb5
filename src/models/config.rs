//! Configuration data model and validation

use crate::error::{AppError, Result};
use crate::logging::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP listener binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// TCP port of the HTTP listener
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the telemetry JSON file, relative to the working directory
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Worker threads of the request runtime
    #[serde(default = "crate::defaults::default_worker_threads")]
    pub worker_threads: usize,

    /// Minimum level written by the loggers
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Log line format
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            data_file: default_data_file(),
            worker_threads: crate::defaults::default_worker_threads(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Socket address the listener should bind to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_address.trim().parse().map_err(|e| {
            AppError::config(format!("Invalid bind address '{}': {}", self.bind_address, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Log level after applying the verbose/debug flags
    pub fn effective_log_level(&self) -> LogLevel {
        if self.debug {
            self.log_level.min(LogLevel::Debug)
        } else {
            self.log_level
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.bind_address.trim().is_empty() {
            return Err(AppError::config("Bind address cannot be empty"));
        }

        self.socket_addr()?;

        if self.port == 0 {
            return Err(AppError::config("Port must be greater than 0"));
        }

        if self.data_file.as_os_str().is_empty() {
            return Err(AppError::config("Telemetry data file path cannot be empty"));
        }

        if self.worker_threads == 0 {
            return Err(AppError::config("Worker thread count must be greater than 0"));
        }

        if self.worker_threads > crate::defaults::MAX_WORKER_THREADS {
            return Err(AppError::config(format!(
                "Worker thread count cannot exceed {}",
                crate::defaults::MAX_WORKER_THREADS
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(bind_address) = std::env::var("BIND_ADDRESS") {
            self.bind_address = bind_address.trim().to_string();
        }

        if let Ok(port) = std::env::var("PORT") {
            self.port = port.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PORT value '{}': {}", port, e)))?;
        }

        if let Ok(data_file) = std::env::var("TELEMETRY_FILE") {
            let data_file = data_file.trim();
            if !data_file.is_empty() {
                self.data_file = PathBuf::from(data_file);
            }
        }

        if let Ok(workers) = std::env::var("WORKER_THREADS") {
            self.worker_threads = workers.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid WORKER_THREADS value '{}': {}", workers, e)))?;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.log_level = level.parse()
                .map_err(|e| AppError::config(format!("Invalid LOG_LEVEL value '{}': {}", level, e)))?;
        }

        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.log_format = format.parse()
                .map_err(|e| AppError::config(format!("Invalid LOG_FORMAT value '{}': {}", format, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

fn default_bind_address() -> String {
    crate::defaults::DEFAULT_BIND_ADDRESS.to_string()
}

fn default_port() -> u16 {
    crate::defaults::DEFAULT_PORT
}

fn default_data_file() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_DATA_FILE)
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_log_format() -> LogFormat {
    LogFormat::Console
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
