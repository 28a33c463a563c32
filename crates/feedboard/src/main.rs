use anyhow::{Context, Result};
use feedboard::settings::LOG_FILE_ENV;
use feedboard::{logging, Dashboard, DashboardFlags, Settings, TwitchConnector};
use feedboard_core::ProgramOptions;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("feedboard: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    logging::init_from_env(LOG_FILE_ENV)?;

    let settings = Settings::default();
    settings.validate().context("Invalid settings")?;
    tracing::info!(sources = settings.sources.len(), "starting feedboard");

    let flags = DashboardFlags {
        sources: settings.sources,
        buffer_capacity: settings.buffer_capacity,
        connector: Arc::new(TwitchConnector::default()),
        terminal_input: true,
    };
    let options = ProgramOptions {
        title: Some("feedboard".to_string()),
        intake_capacity: settings.intake_capacity,
        ..ProgramOptions::default()
    };

    let dashboard = feedboard_core::run_with::<Dashboard>(flags, options)
        .await
        .context("Dashboard failed")?;
    tracing::info!(dropped = dashboard.dropped(), "feedboard stopped");
    Ok(())
}
