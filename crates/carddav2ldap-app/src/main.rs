use carddav2ldap_core::config::load_config;
use carddav2ldap_core::constants::DEFAULT_LOG_LEVEL;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true))
        .init();

    tracing::info!("Starting CardDAV to LDAP synchronization");

    let settings = load_config()?;

    tracing::info!(config = ?settings, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(settings.log_level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %settings.log_level, "Invalid log level in config, keeping default");
    }

    let report = carddav2ldap_app::sync::run(&settings).await?;

    tracing::info!(
        parsed = report.parsed,
        added = report.added,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.failed,
        "Synchronization process completed"
    );

    Ok(())
}
