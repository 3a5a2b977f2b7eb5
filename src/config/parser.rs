//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        let mut config = Config::default();

        // Load from environment file if it exists
        EnvManager::load_env_file(self.cli.debug)?;

        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(ref bind_address) = self.cli.bind_address {
            config.bind_address = bind_address.trim().to_string();
        }

        if let Some(port) = self.cli.port {
            config.port = port;
        }

        if let Some(ref data_file) = self.cli.data_file {
            config.data_file = data_file.clone();
        }

        if let Some(workers) = self.cli.worker_threads {
            config.worker_threads = workers;
        }

        if let Some(ref level) = self.cli.log_level {
            config.log_level = level.parse()
                .map_err(|e| AppError::config(format!("Invalid --log-level '{}': {}", level, e)))?;
        }

        if let Some(ref format) = self.cli.log_format {
            config.log_format = format.parse()
                .map_err(|e| AppError::config(format!("Invalid --log-format '{}': {}", format, e)))?;
        }

        if self.cli.no_color {
            config.enable_color = false;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        Ok(())
    }
}

/// Convenience function to load configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Listen Address: {}:{}", config.bind_address, config.port));
    summary.push(format!("Telemetry File: {}", config.data_file.display()));
    summary.push(format!("Worker Threads: {}", config.worker_threads));
    summary.push(format!("Log Level: {}", config.effective_log_level().as_str()));
    summary.push(format!("Log Format: {:?}", config.log_format));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
