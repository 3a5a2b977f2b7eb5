//! Structured logging for the region latency stats service
//!
//! This module provides:
//! - Leveled logging with console, JSON and compact output
//! - Session and per-request correlation IDs
//! - Request logging for the HTTP surface
//! - Error event logging with error category fields

use crate::error::{AppError, Result};
use crate::models::Config;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general service information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but the service can continue
    Error = 4,
    /// Fatal level - severe error events that stop the service
    Fatal = 5,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Colored, right-aligned level tag for console output
    fn colored_tag(&self) -> String {
        let tag = format!("{:>5}", self.as_str());
        match self {
            LogLevel::Trace => tag.white().to_string(),
            LogLevel::Debug => tag.cyan().to_string(),
            LogLevel::Info => tag.green().to_string(),
            LogLevel::Warn => tag.yellow().to_string(),
            LogLevel::Error => tag.red().to_string(),
            LogLevel::Fatal => tag.magenta().bold().to_string(),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "console" | "pretty" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(AppError::parse(format!("Invalid log format: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    /// Additional structured fields
    pub fields: HashMap<String, serde_json::Value>,
    /// Thread name if available
    pub thread_id: Option<String>,
    /// File and line information
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    /// Source file name
    pub file: String,
    /// Line number
    pub line: u32,
    /// Module path
    pub module: Option<String>,
}

/// Logger with multiple output formats
#[derive(Clone)]
pub struct Logger {
    /// Minimum log level to output
    min_level: LogLevel,
    /// Whether to use colored output
    use_color: bool,
    /// Whether to include location information
    include_location: bool,
    /// Output format
    format: LogFormat,
    /// Logger name
    name: String,
    /// Shared context storage
    context: Arc<RwLock<LogContext>>,
}

/// Shared logging context for session tracking
#[derive(Debug, Default)]
struct LogContext {
    /// Global correlation ID for the process
    session_id: Option<String>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger with specific configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        Self {
            min_level: config.effective_log_level(),
            use_color: config.enable_color,
            include_location: config.debug,
            format: config.log_format,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Logger that drops everything, for tests and embedding
    pub fn disabled(name: &str) -> Self {
        let mut logger = Self::new(name.to_string());
        logger.min_level = LogLevel::Fatal;
        logger.use_color = false;
        logger
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    /// Convenience methods for different log levels
    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Apply context and render an entry, or `None` when it is filtered out
    async fn render(&self, mut entry: LogEntry) -> Option<(LogLevel, String)> {
        if !self.would_log(entry.level) {
            return None;
        }

        let context = self.context.read().await;
        if let Some(session_id) = &context.session_id {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }
        drop(context);

        let output = match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
            LogFormat::Compact => self.format_compact(&entry),
        };

        Some((entry.level, output))
    }

    /// Write log entry to output
    async fn write_entry(&self, entry: LogEntry) {
        if let Some((level, output)) = self.render(entry).await {
            // Write to stderr for errors/warnings, stdout for others
            if level >= LogLevel::Warn {
                let _ = writeln!(io::stderr(), "{}", output);
            } else {
                let _ = writeln!(io::stdout(), "{}", output);
            }
        }
    }

    /// Format log entry for console output
    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");

        let formatted_level = if self.use_color {
            entry.level.colored_tag()
        } else {
            format!("{:>5}", entry.level.as_str())
        };

        let mut output = format!("{} {} [{}] {}",
            timestamp,
            formatted_level,
            entry.logger,
            entry.message
        );

        // Show the first 8 chars of the correlation ID
        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields_str: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields_str.sort();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    /// Format log entry as JSON
    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => serde_json::json!({
                "error": "Failed to serialize log entry",
                "message": entry.message,
            })
            .to_string(),
        }
    }

    /// Format log entry in compact format
    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!("{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
                thread_id: std::thread::current().name().map(String::from),
                location: None,
            },
        }
    }

    /// Add a correlation ID
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add location information
    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_client", error.is_client_error())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Logger for the HTTP surface
#[derive(Clone)]
pub struct RequestLogger {
    logger: Logger,
}

impl RequestLogger {
    /// Wrap an existing logger
    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// Request logger that writes nothing
    pub fn disabled() -> Self {
        Self::from_logger(Logger::disabled("HTTP"))
    }

    /// Allocate a correlation ID for a new request
    pub fn new_correlation_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Log a completed HTTP request
    pub async fn log_request(
        &self,
        correlation_id: &str,
        method: &str,
        path: &str,
        status: u16,
        duration: Duration,
    ) {
        let duration_ms = duration.as_secs_f64() * 1000.0;
        let level = if status >= 500 {
            LogLevel::Error
        } else if status >= 400 {
            LogLevel::Warn
        } else {
            LogLevel::Info
        };

        self.logger.log(level, &format!("{} {} -> {} ({:.3}ms)", method, path, status, duration_ms))
            .correlation_id(correlation_id)
            .field("method", method)
            .field("path", path)
            .field("status", status)
            .field("duration_ms", duration_ms)
            .log()
            .await;
    }

    /// Log the outcome of a statistics query
    pub async fn log_query(&self, correlation_id: &str, requested: usize, returned: usize, threshold_ms: i64) {
        self.logger.debug(&format!("Computed statistics for {}/{} regions", returned, requested))
            .correlation_id(correlation_id)
            .field("requested_regions", requested)
            .field("returned_regions", returned)
            .field("threshold_ms", threshold_ms)
            .log()
            .await;
    }
}

/// Error event logger with enhanced context
#[derive(Clone)]
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    /// Wrap an existing logger
    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// Log an error event
    pub async fn log_error(&self, error: &AppError, context: Option<&str>, correlation_id: Option<&str>) {
        let level = if error.is_client_error() { LogLevel::Warn } else { LogLevel::Error };
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let mut builder = self.logger.log(level, &message).error_info(error);

        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }

        if let Some(id) = correlation_id {
            builder = builder.correlation_id(id);
        }

        builder.log().await;
    }
}

/// Factory for creating loggers sharing one session
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    /// Create a new logger factory
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    /// Create a request logger
    pub async fn create_request_logger(&self) -> RequestLogger {
        RequestLogger::from_logger(self.create_logger("HTTP").await)
    }

    /// Create an error event logger
    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        ErrorEventLogger::from_logger(self.create_logger("ERROR").await)
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}
