use anyhow::Result;
use statusq::config::{AppConfig, Credentials};
use statusq::consumer::{self, ConsumerOptions};
use statusq::logging;
use statusq::transport::memory::MemoryTransport;

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

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        queue_manager = %config.transport.queue_manager,
        queue = %config.transport.queue,
        "starting status consumer (message ids)"
    );
    let mut stdout = std::io::stdout();
    let received = consumer::run(
        &transport,
        &config.transport,
        &credentials,
        ConsumerOptions {
            show_message_id: true,
        },
        &mut stdout,
    )
    .await?;
    tracing::info!(messages_received = received, "consumer finished");
    Ok(())
}
