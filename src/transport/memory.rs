// In-process queue manager: named FIFO queues behind the Transport seam.
// Backs the test suite and the binaries' local wiring; a broker-backed
// implementation slots in behind the same traits.

use super::{
    Ack, Connection, Delivery, MESSAGE_ID_LEN, MessageId, ReceiveQueue, SendQueue, Transport,
    TransportError,
};
use crate::config::Credentials;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const DEFAULT_RECEIVE_BUFFER: usize = 4096;

pub struct MemoryTransport {
    inner: Arc<Broker>,
}

struct Broker {
    name: String,
    /// Expected credential pair; `None` accepts any.
    expected: Option<Credentials>,
    receive_buffer: usize,
    queues: Mutex<HashMap<String, Arc<QueueState>>>,
    next_seq: AtomicU64,
}

struct QueueState {
    // Std mutex: never held across an await point.
    messages: Mutex<VecDeque<StoredMessage>>,
    notify: Notify,
}

struct StoredMessage {
    id: MessageId,
    body: Bytes,
}

impl MemoryTransport {
    pub fn new(queue_manager: &str) -> Self {
        Self::with_options(queue_manager, None, DEFAULT_RECEIVE_BUFFER)
    }

    pub fn with_options(
        queue_manager: &str,
        expected: Option<Credentials>,
        receive_buffer: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Broker {
                name: queue_manager.to_string(),
                expected,
                receive_buffer,
                queues: Mutex::new(HashMap::new()),
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Create the named queue if it does not already exist. Opening an
    /// undeclared queue fails with `NotFound`, as on a real queue manager.
    pub fn declare_queue(&self, name: &str) {
        let mut queues = self.inner.queues.lock().unwrap_or_else(|e| e.into_inner());
        queues.entry(name.to_string()).or_insert_with(|| {
            Arc::new(QueueState {
                messages: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
            })
        });
    }
}

impl Broker {
    fn lookup(&self, queue: &str) -> Result<Arc<QueueState>, TransportError> {
        let queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        queues
            .get(queue)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(queue.to_string()))
    }

    /// Fresh identifier per send: queue manager name, then a big-endian
    /// sequence number in the trailing eight bytes.
    fn assign_id(&self) -> MessageId {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let mut bytes = [0u8; MESSAGE_ID_LEN];
        let name = self.name.as_bytes();
        let n = name.len().min(MESSAGE_ID_LEN - 8);
        bytes[..n].copy_from_slice(&name[..n]);
        bytes[MESSAGE_ID_LEN - 8..].copy_from_slice(&seq.to_be_bytes());
        MessageId(bytes)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(
        &self,
        queue_manager: &str,
        credentials: &Credentials,
    ) -> Result<Box<dyn Connection>, TransportError> {
        if queue_manager != self.inner.name {
            return Err(TransportError::Unavailable(queue_manager.to_string()));
        }
        if let Some(expected) = &self.inner.expected {
            if expected != credentials {
                return Err(TransportError::Auth(credentials.username.clone()));
            }
        }
        Ok(Box::new(MemoryConnection {
            broker: self.inner.clone(),
        }))
    }
}

struct MemoryConnection {
    broker: Arc<Broker>,
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn open_for_send(&self, queue: &str) -> Result<Box<dyn SendQueue>, TransportError> {
        let state = self.broker.lookup(queue)?;
        Ok(Box::new(MemorySendQueue {
            broker: self.broker.clone(),
            state,
        }))
    }

    async fn open_for_receive(&self, queue: &str) -> Result<Box<dyn ReceiveQueue>, TransportError> {
        let state = self.broker.lookup(queue)?;
        Ok(Box::new(MemoryReceiveQueue {
            receive_buffer: self.broker.receive_buffer,
            state,
        }))
    }

    async fn disconnect(self: Box<Self>) -> Result<(), TransportError> {
        Ok(())
    }
}

struct MemorySendQueue {
    broker: Arc<Broker>,
    state: Arc<QueueState>,
}

#[async_trait]
impl SendQueue for MemorySendQueue {
    async fn send(&mut self, body: &[u8]) -> Result<Ack, TransportError> {
        let id = self.broker.assign_id();
        {
            let mut messages = self
                .state
                .messages
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            messages.push_back(StoredMessage {
                id,
                body: Bytes::copy_from_slice(body),
            });
        }
        self.state.notify.notify_one();
        Ok(Ack { message_id: id })
    }

    async fn close(self: Box<Self>) -> Result<(), TransportError> {
        Ok(())
    }
}

struct MemoryReceiveQueue {
    receive_buffer: usize,
    state: Arc<QueueState>,
}

#[async_trait]
impl ReceiveQueue for MemoryReceiveQueue {
    async fn receive(&mut self, max_wait: Duration) -> Result<Delivery, TransportError> {
        let deadline = tokio::time::Instant::now() + max_wait;
        loop {
            // Register interest before checking, so a send between the
            // check and the wait is not missed.
            let notified = self.state.notify.notified();
            {
                let mut messages = self
                    .state
                    .messages
                    .lock()
                    .unwrap_or_else(|e| e.into_inner());
                if let Some(front) = messages.front() {
                    if front.body.len() > self.receive_buffer {
                        // Message stays on the queue, as with a failed
                        // truncated get.
                        return Err(TransportError::Truncated {
                            len: front.body.len(),
                            max: self.receive_buffer,
                        });
                    }
                }
                if let Some(message) = messages.pop_front() {
                    return Ok(Delivery {
                        message_id: message.id,
                        body: message.body,
                    });
                }
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Err(TransportError::NoMessage(max_wait.as_millis() as u64));
            }
        }
    }

    async fn close(self: Box<Self>) -> Result<(), TransportError> {
        Ok(())
    }
}
