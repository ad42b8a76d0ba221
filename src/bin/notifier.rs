use anyhow::Result;
use dotenvy::dotenv;
use log::{info, warn};
use std::sync::Arc;

use meek::core::Config;
use meek::features::notifications::{Dispatcher, LogSink, NotificationScheduler};
use meek::features::{get_features, get_version};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Meek notifier v{}...", get_version());
    for feature in get_features() {
        info!("  {} v{} ({})", feature.name, feature.version, feature.id);
    }

    let settings = config.default_settings();
    let scheduler = NotificationScheduler::new().with_warning_offset(config.warning_offset());
    let dispatcher = Dispatcher::new(
        scheduler,
        settings.clone(),
        config.default_madhab,
        Arc::new(LogSink),
    );

    info!(
        "🕌 Notifications for {} ({}, {}) using {} Asr",
        settings.timezone, settings.latitude, settings.longitude, config.default_madhab
    );

    let dispatch_task = tokio::spawn(dispatcher.run(config.dispatch_interval()));

    tokio::signal::ctrl_c().await?;
    warn!("Shutdown requested");

    dispatch_task.abort();
    info!("👋 Notifier stopped");

    Ok(())
}
