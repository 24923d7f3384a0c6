//! Card server binary.
//!
//! Loads configuration, starts the axum web server and waits for Ctrl+C.

use tracing_subscriber::EnvFilter;

use qr_card_lib::app::SharedState;
use qr_card_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting QR card server");

    let config = qr_card_lib::init_foundation()?;
    let state = SharedState::new(config);

    server::start_server(state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
        tracing::info!("Shutting down...");
    })
    .await
}
