//! Order producer.
//!
//! Publishes `{"orderId": n}` through the sidecar every
//! `PRODUCER_INTERVAL_SECS` seconds until interrupted.
//!
//! # Usage
//!
//! ```bash
//! PRODUCER_TARGETS=neworder cargo run --bin order-producer
//! ```

use order_gateway::{
    OrderProducer, ProducerConfig,
    lifecycle::{init_tracing, shutdown_signal},
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = ProducerConfig::from_env()?;
    tracing::info!(
        sidecar = %config.sidecar.url,
        event_name = %config.event_name,
        targets = ?config.targets,
        interval_secs = config.interval_secs,
        "Starting order producer"
    );

    let sidecar = config.sidecar.client()?;
    let mut producer = OrderProducer::new(config.event_name.clone(), config.targets.clone())?;

    producer
        .run(
            &sidecar,
            Duration::from_secs(config.interval_secs),
            shutdown_signal(),
        )
        .await;

    Ok(())
}
