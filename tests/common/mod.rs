// Shared test helpers

use statusq::config::{Credentials, TransportConfig};
use statusq::transport::memory::MemoryTransport;

pub const QUEUE_MANAGER: &str = "QM1";
pub const QUEUE: &str = "DEV.STATUS";

pub fn demo_credentials() -> Credentials {
    Credentials {
        username: "app".into(),
        password: "passw0rd".into(),
    }
}

pub fn transport_config(wait_timeout_ms: u64) -> TransportConfig {
    TransportConfig {
        queue_manager: QUEUE_MANAGER.into(),
        queue: QUEUE.into(),
        credentials_file: "credentials.txt".into(),
        wait_timeout_ms,
        max_message_len: 4096,
    }
}

pub fn broker_with_queue() -> MemoryTransport {
    let transport = MemoryTransport::new(QUEUE_MANAGER);
    transport.declare_queue(QUEUE);
    transport
}
