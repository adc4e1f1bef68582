use anyhow::Result;
use statusq::config::{AppConfig, Credentials};
use statusq::metrics_repo::MetricsRepo;
use statusq::transport::memory::MemoryTransport;
use statusq::{logging, producer};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = AppConfig::load()?;
    let credentials = Credentials::load(&config.transport.credentials_file)?;

    // In-process transport wiring; a broker-backed Transport slots in here.
    let transport = MemoryTransport::with_options(
        &config.transport.queue_manager,
        None,
        config.transport.max_message_len,
    );
    transport.declare_queue(&config.transport.queue);

    let repo = MetricsRepo::new(Duration::from_millis(config.sampler.sample_delay_ms));

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        queue_manager = %config.transport.queue_manager,
        queue = %config.transport.queue,
        "starting status producer"
    );
    let sent = producer::run(
        &transport,
        &config.transport,
        &config.producer,
        &credentials,
        &repo,
    )
    .await?;
    tracing::info!(reports_sent = sent, "producer finished");
    Ok(())
}
