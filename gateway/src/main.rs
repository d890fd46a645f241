//! Order gateway HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Sidecar listening on :3501, gateway on :3000
//! SIDECAR_URL=http://localhost:3501 cargo run --bin order-gateway
//! ```

use order_gateway::{
    GatewayConfig,
    lifecycle::{init_tracing, shutdown_signal},
    server::{AppState, build_router},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    init_tracing();

    info!("Starting order gateway");

    let config = GatewayConfig::from_env()?;
    info!(
        sidecar = %config.sidecar.url,
        routes = %config.server.routes,
        failure_mode = %config.server.failure_mode,
        store = %config.orders.store,
        topic = %config.orders.topic,
        "Configuration loaded"
    );

    let sidecar = Arc::new(config.sidecar.client()?);
    let state = AppState::new(sidecar, config.orders.clone(), config.server.failure_mode);
    let app = build_router(state, config.server.routes);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Order gateway listening");

    // Fires once a signal arrives, or when the server stops on its own.
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let server = tokio::spawn(async move { serve.await });

    let _ = signalled_rx.await;

    let grace = Duration::from_secs(config.server.shutdown_timeout);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => warn!(
            timeout_secs = config.server.shutdown_timeout,
            "In-flight requests did not finish in time, exiting"
        ),
    }

    info!("Order gateway stopped");
    Ok(())
}
