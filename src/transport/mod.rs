// Queue transport seam: connect/open/put/get/close/disconnect.
// The broker itself is an external system; an implementation adapts one
// concrete messaging client to this surface. Datagram semantics only:
// no syncpoints, no delivery receipts, no client-supplied identifiers.

pub mod memory;

use crate::config::Credentials;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;

/// Length of a transport-assigned message identifier, in bytes.
pub const MESSAGE_ID_LEN: usize = 24;

/// Opaque transport-assigned identifier for one queued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub [u8; MESSAGE_ID_LEN]);

impl MessageId {
    /// Two lowercase hex digits per byte, concatenated with no separator.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("queue manager {0} is unavailable")]
    Unavailable(String),
    #[error("authentication rejected for user {0}")]
    Auth(String),
    #[error("queue {0} does not exist")]
    NotFound(String),
    #[error("not authorized to open queue {0}")]
    Permission(String),
    #[error("no message available after {0} ms")]
    NoMessage(u64),
    #[error("message of {len} bytes exceeds the {max} byte receive buffer")]
    Truncated { len: usize, max: usize },
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Receipt for one accepted send.
#[derive(Debug, Clone)]
pub struct Ack {
    pub message_id: MessageId,
}

/// One message pulled off a queue.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message_id: MessageId,
    pub body: Bytes,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(
        &self,
        queue_manager: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn Connection>, TransportError>;
}

#[async_trait]
pub trait Connection: Send {
    async fn open_for_send(&self, queue: &str) -> Result<Box<dyn SendQueue>, TransportError>;

    async fn open_for_receive(&self, queue: &str) -> Result<Box<dyn ReceiveQueue>, TransportError>;

    async fn disconnect(self: Box<Self>) -> Result<(), TransportError>;
}

#[async_trait]
pub trait SendQueue: Send {
    /// Enqueue one datagram. The transport assigns fresh message and
    /// correlation identifiers on every send; the body is a plain
    /// character-string payload.
    async fn send(&mut self, body: &[u8]) -> Result<Ack, TransportError>;

    async fn close(self: Box<Self>) -> Result<(), TransportError>;
}

#[async_trait]
pub trait ReceiveQueue: Send {
    /// Pull the next datagram, waiting up to `max_wait`. Expiry of the
    /// wait yields `NoMessage`, the normal end of a consumer loop.
    async fn receive(&mut self, max_wait: Duration) -> Result<Delivery, TransportError>;

    async fn close(self: Box<Self>) -> Result<(), TransportError>;
}
