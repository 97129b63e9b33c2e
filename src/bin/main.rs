use anyhow::Context;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wizarr_bridge::app;
use wizarr_bridge::common::settings::AppSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var_os("WIZARR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/settings.yaml"));
    let settings = AppSettings::load(&config_path)
        .with_context(|| format!("loading settings from {}", config_path.display()))?;

    let handle = app::start(&settings).await.context("starting wizarr bridge")?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    handle.stop().await;
    Ok(())
}
