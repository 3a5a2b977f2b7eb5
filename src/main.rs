//! Region Latency Stats - HTTP service entry point

use anyhow::Context;
use clap::Parser;
use region_latency_stats::{
    build_info,
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager, ValidationLevel, ValidationWarning},
    dataset,
    error::AppError,
    log_debug, log_info,
    logging::LoggerFactory,
    models::{Config, TelemetryTable},
    server::{self, AppState},
};
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Service panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();

    if cli.env_help {
        print!("{}", EnvManager::display_env_help());
        return;
    }

    let config = match load_config(cli.clone()) {
        Ok(config) => config,
        Err(e) => {
            let use_color = !cli.no_color;
            eprintln!("{}", e.format_for_console(use_color));
            eprintln!();
            eprintln!("{}", e.user_friendly_message());
            process::exit(e.exit_code());
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name("latency-stats-worker")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            process::exit(AppError::from(e).exit_code());
        }
    };

    if let Err(e) = runtime.block_on(run(config.clone(), cli.check_data)) {
        eprintln!("Error: {:#}", e);

        let exit_code = match e.downcast_ref::<AppError>() {
            Some(app_error) => {
                if config.verbose || config.debug {
                    eprintln!();
                    eprintln!("{}", app_error.user_friendly_message());
                }
                app_error.exit_code()
            }
            None => 1,
        };

        process::exit(exit_code);
    }
}

/// Load the dataset and serve until shutdown
async fn run(config: Config, check_data: bool) -> anyhow::Result<()> {
    let factory = LoggerFactory::new(config.clone());
    let logger = factory.create_logger("APP").await;

    log_info!(logger, "Starting {}", build_info());
    log_debug!(logger, "Configuration:\n{}", display_config_summary(&config));

    let warnings = validate_config(&config).context("Configuration validation failed")?;

    let data_logger = factory.create_logger("DATA").await;
    let table = Arc::new(dataset::load_or_empty(&config.data_file, &data_logger).await);

    if check_data {
        return report_dataset(&config, &table, &warnings);
    }

    for warning in &warnings {
        let builder = match warning.level {
            ValidationLevel::Info => logger.info(&warning.message),
            ValidationLevel::Warning => logger.warn(&warning.message),
            ValidationLevel::Error => logger.error(&warning.message),
        };
        builder.field("source", "config").log().await;
    }

    if table.is_empty() {
        logger.warn("Serving without telemetry data; statistics requests will return an error")
            .field("data_file", config.data_file.display().to_string())
            .log()
            .await;
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::io(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr().context("Failed to read listener address")?;

    let state = AppState::new(
        table,
        factory.create_request_logger().await,
        factory.create_error_logger().await,
    );

    logger.info(&format!("Listening on http://{}", local_addr))
        .field("address", local_addr.to_string())
        .field("workers", config.worker_threads)
        .log()
        .await;

    server::serve(listener, state, server::shutdown_signal()).await?;

    log_info!(logger, "Shutdown complete");
    Ok(())
}

/// Print a dataset summary for `--check-data`
fn report_dataset(
    config: &Config,
    table: &TelemetryTable,
    warnings: &[ValidationWarning],
) -> anyhow::Result<()> {
    for warning in warnings {
        println!("{}", warning.format(config.enable_color));
    }

    if table.is_empty() {
        return Err(AppError::data_unavailable(format!(
            "no telemetry records could be loaded from '{}'",
            config.data_file.display()
        ))
        .into());
    }

    let regions = table.regions();
    println!("Telemetry file: {}", config.data_file.display());
    println!("Records: {}", table.len());
    println!("Regions ({}): {}", regions.len(), regions.join(", "));
    Ok(())
}
