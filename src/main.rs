use clap::Parser;
use color_eyre::eyre::Result;
use tracing::error;

mod cli;
mod commands;
mod render;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error hooks
    color_eyre::install()?;

    let cli = Cli::parse();

    setup_logging()?;

    if let Err(e) = commands::run(cli).await {
        error!("Command failed: {:?}", e);
        return Err(e);
    }

    Ok(())
}

fn setup_logging() -> Result<()> {
    use std::env;
    use tracing_subscriber::EnvFilter;

    let log_dir = env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("datasetkit.log");

    // Create or truncate log file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("datasetkit=debug,info"));

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .init();

    tracing::info!("Starting datasetkit {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log file: {}", log_path.display());
    tracing::info!("Working directory: {}", env::current_dir()?.display());

    Ok(())
}
