// Consumer loop: pull datagrams off the queue and print them.
// The loop ends when the receive wait expires with no message; any other
// receive failure is terminal but cleanup is still attempted.

use crate::config::{Credentials, TransportConfig};
use crate::transport::{Transport, TransportError};
use std::io::Write;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsumerOptions {
    /// Print the hex-encoded message identifier before each body.
    pub show_message_id: bool,
}

/// Drains the queue into `out`, one message per iteration, until the
/// configured wait expires. Returns the number of messages printed.
/// A connect failure halts immediately; an open failure disconnects
/// before halting; any other failure is returned after close/disconnect.
pub async fn run(
    transport: &dyn Transport,
    transport_cfg: &TransportConfig,
    credentials: &Credentials,
    options: ConsumerOptions,
    out: &mut dyn Write,
) -> anyhow::Result<u64> {
    let conn = transport
        .connect(&transport_cfg.queue_manager, credentials)
        .await?;

    let mut queue = match conn.open_for_receive(&transport_cfg.queue).await {
        Ok(queue) => queue,
        Err(e) => {
            tracing::error!(
                error = %e,
                queue = %transport_cfg.queue,
                operation = "open_for_receive",
                "unable to open queue for input"
            );
            if let Err(e) = conn.disconnect().await {
                tracing::warn!(error = %e, operation = "disconnect", "disconnect failed");
            }
            return Err(e.into());
        }
    };

    let max_wait = Duration::from_millis(transport_cfg.wait_timeout_ms);
    let mut received: u64 = 0;
    let mut failure: Option<anyhow::Error> = None;

    loop {
        match queue.receive(max_wait).await {
            Ok(delivery) => {
                let printed = if options.show_message_id {
                    writeln!(
                        out,
                        "{}\n{}",
                        delivery.message_id.to_hex(),
                        String::from_utf8_lossy(&delivery.body)
                    )
                } else {
                    writeln!(out, "{}", String::from_utf8_lossy(&delivery.body))
                };
                if let Err(e) = printed {
                    failure = Some(anyhow::Error::new(e).context("writing message body"));
                    break;
                }
                received += 1;
            }
            Err(TransportError::NoMessage(waited_ms)) => {
                tracing::info!(
                    waited_ms,
                    operation = "receive",
                    "no messages on the queue"
                );
                break;
            }
            Err(e @ TransportError::Truncated { .. }) => {
                tracing::error!(error = %e, operation = "receive", "message truncated");
                failure = Some(e.into());
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, operation = "receive", "get failed");
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
        None => Ok(received),
    }
}
