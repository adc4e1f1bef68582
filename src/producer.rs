// Producer loop: build status reports and put them on the queue.
// Sequential connect -> open -> put loop -> close -> disconnect; the first
// failure ends the loop, cleanup is still attempted.

use crate::config::{Credentials, ProducerConfig, TransportConfig};
use crate::metrics_repo::MetricsRepo;
use crate::transport::Transport;

/// Runs the enqueue loop. Returns the number of reports sent; the first
/// sampler or delivery failure is returned after close/disconnect have
/// been attempted. A connect failure halts immediately; an open failure
/// disconnects before halting.
pub async fn run(
    transport: &dyn Transport,
    transport_cfg: &TransportConfig,
    producer_cfg: &ProducerConfig,
    credentials: &Credentials,
    repo: &MetricsRepo,
) -> anyhow::Result<u64> {
    let conn = transport
        .connect(&transport_cfg.queue_manager, credentials)
        .await?;

    let mut queue = match conn.open_for_send(&transport_cfg.queue).await {
        Ok(queue) => queue,
        Err(e) => {
            tracing::error!(
                error = %e,
                queue = %transport_cfg.queue,
                operation = "open_for_send",
                "unable to open queue for output"
            );
            if let Err(e) = conn.disconnect().await {
                tracing::warn!(error = %e, operation = "disconnect", "disconnect failed");
            }
            return Err(e.into());
        }
    };

    let mut sent: u64 = 0;
    let mut failure: Option<anyhow::Error> = None;

    for _ in 0..producer_cfg.report_count {
        let report = match repo.build_report().await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = "build_report",
                    "status sampling failed"
                );
                failure = Some(e);
                break;
            }
        };
        let body = report.render();
        match queue.send(body.as_bytes()).await {
            Ok(ack) => {
                tracing::info!(
                    message_id = %ack.message_id,
                    bytes = body.len(),
                    operation = "send",
                    "status report enqueued"
                );
                sent += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, operation = "send", "put failed");
                failure = Some(e.into());
                break;
            }
        }
    }

    if let Err(e) = queue.close().await {
        tracing::warn!(error = %e, operation = "close", "close failed");
    }
    if let Err(e) = conn.disconnect().await {
        tracing::warn!(error = %e, operation = "disconnect", "disconnect failed");
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(sent),
    }
}
