//! Configuration validation rules that produce warnings rather than errors

use crate::{error::Result, models::Config};

/// Configuration validator with advisory checks
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration, returning non-fatal warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        config.validate()?;

        warnings.extend(Self::validate_listener(config)?);
        warnings.extend(Self::validate_data_file(config));
        warnings.extend(Self::validate_workers(config));

        Ok(warnings)
    }

    fn validate_listener(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();
        let addr = config.socket_addr()?;

        if addr.ip().is_unspecified() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Listening on all interfaces ({}); the API will be reachable from other hosts", addr),
            ));
        }

        if addr.port() < 1024 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Port {} is privileged and may require elevated permissions", addr.port()),
            ));
        }

        Ok(warnings)
    }

    fn validate_data_file(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let path = &config.data_file;

        if !path.exists() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Telemetry file '{}' does not exist; every statistics request will fail until it is provided",
                    path.display()
                ),
            ));
        } else if path.is_dir() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Error,
                format!("Telemetry path '{}' is a directory", path.display()),
            ));
        } else if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Telemetry file '{}' does not have a .json extension", path.display()),
            ));
        }

        warnings
    }

    fn validate_workers(config: &Config) -> Vec<ValidationWarning> {
        let cpus = num_cpus::get();
        if config.worker_threads > cpus * 4 {
            vec![ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "{} worker threads configured on a machine with {} CPUs",
                    config.worker_threads, cpus
                ),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Severity of a validation warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            let tag = match self.level {
                ValidationLevel::Info => self.level.as_str().blue(),
                ValidationLevel::Warning => self.level.as_str().yellow(),
                ValidationLevel::Error => self.level.as_str().red(),
            };
            format!("[{}] {}", tag, self.message)
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
