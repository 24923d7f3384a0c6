pub mod api;
pub mod assets;
pub mod router;

use std::future::Future;

use crate::app::SharedState;
use anyhow::Result;

/// Start the axum HTTP server and run until `shutdown` resolves.
pub async fn start_server(
    state: SharedState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = state.config().bind_addr();
    let app = router::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("QR card server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
