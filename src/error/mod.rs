//! Error handling for the region latency stats service

use thiserror::Error;

/// Custom error types for the region latency stats service
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (dataset file, socket binding)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (JSON, addresses, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// The telemetry table is empty because the dataset failed to load
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new data-unavailable error
    pub fn data_unavailable<S: Into<String>>(message: S) -> Self {
        Self::DataUnavailable(message.into())
    }

    /// Create a new server error
    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Server(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::DataUnavailable(_) => "DATA",
            Self::Server(_) => "SERVER",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether the error was caused by the caller rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file, environment variables or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Send a JSON body of the form {{\"regions\": [...], \"threshold_ms\": 180}}.", msg)
            }
            Self::Io(msg) => {
                format!("File or socket operation failed: {}\n\nSuggestion: Check file paths, permissions and that the port is free.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: The telemetry file must be a JSON array of {{region, latency_ms, uptime_pct}} objects.", msg)
            }
            Self::DataUnavailable(msg) => {
                format!("Telemetry data unavailable: {}\n\nSuggestion: Place the telemetry file next to the service or pass --data-file.", msg)
            }
            Self::Server(msg) => {
                format!("Server failure: {}\n\nSuggestion: Check the logs for the underlying cause.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Io(_) => 5,
            Self::DataUnavailable(_) => 6,
            Self::Server(_) => 7,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Io(_) | Self::DataUnavailable(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Server(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("Address parse error: {}", error))
    }
}

/// Result type alias for the service
pub type Result<T> = std::result::Result<T, AppError>;
