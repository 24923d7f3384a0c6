pub mod app;
pub mod config;
pub mod server;
pub mod services;

use std::path::PathBuf;

use config::AppConfig;
use config::defaults::all_settings;

/// Determine the data directory for the application.
/// Priority: QR_CARD_DATA_DIR env var > ~/.qr-card
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("QR_CARD_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".qr-card")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load .env, create the data directory and read runtime config.
pub fn init_foundation() -> anyhow::Result<AppConfig> {
    load_dotenv();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;

    let config = AppConfig::load(dir);
    for def in all_settings() {
        let set = std::env::var(def.key).is_ok_and(|v| !v.is_empty());
        tracing::debug!(key = def.key, set, "{}", def.description);
    }

    tracing::info!(
        data_dir = %config.data_dir().display(),
        "Settings loaded (port={})",
        config.server_port
    );
    Ok(config)
}
