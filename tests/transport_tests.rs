// In-process queue manager contract tests

mod common;

use common::{QUEUE, QUEUE_MANAGER, broker_with_queue, demo_credentials};
use statusq::config::Credentials;
use statusq::transport::memory::MemoryTransport;
use statusq::transport::{MESSAGE_ID_LEN, MessageId, Transport, TransportError};
use std::time::Duration;

const SHORT_WAIT: Duration = Duration::from_millis(20);

#[tokio::test]
async fn test_send_receive_roundtrip() {
    let transport = broker_with_queue();
    let conn = transport
        .connect(QUEUE_MANAGER, &demo_credentials())
        .await
        .expect("connect");

    let mut sender = conn.open_for_send(QUEUE).await.expect("open_for_send");
    let ack = sender.send(b"hello").await.expect("send");

    let mut receiver = conn
        .open_for_receive(QUEUE)
        .await
        .expect("open_for_receive");
    let delivery = receiver.receive(SHORT_WAIT).await.expect("receive");

    assert_eq!(&delivery.body[..], b"hello");
    assert_eq!(delivery.message_id, ack.message_id);

    sender.close().await.expect("close sender");
    receiver.close().await.expect("close receiver");
    conn.disconnect().await.expect("disconnect");
}

#[tokio::test]
async fn test_messages_are_delivered_in_order() {
    let transport = broker_with_queue();
    let conn = transport
        .connect(QUEUE_MANAGER, &demo_credentials())
        .await
        .expect("connect");
    let mut sender = conn.open_for_send(QUEUE).await.expect("open_for_send");
    for body in [b"one".as_slice(), b"two", b"three"] {
        sender.send(body).await.expect("send");
    }

    let mut receiver = conn
        .open_for_receive(QUEUE)
        .await
        .expect("open_for_receive");
    for expected in [b"one".as_slice(), b"two", b"three"] {
        let delivery = receiver.receive(SHORT_WAIT).await.expect("receive");
        assert_eq!(&delivery.body[..], expected);
    }
}

#[tokio::test]
async fn test_every_send_gets_a_fresh_identifier() {
    let transport = broker_with_queue();
    let conn = transport
        .connect(QUEUE_MANAGER, &demo_credentials())
        .await
        .expect("connect");
    let mut sender = conn.open_for_send(QUEUE).await.expect("open_for_send");

    let first = sender.send(b"a").await.expect("send").message_id;
    let second = sender.send(b"a").await.expect("send").message_id;
    assert_ne!(first, second);
    // Trailing bytes carry the sequence number.
    assert_eq!(first.0[MESSAGE_ID_LEN - 1], 1);
    assert_eq!(second.0[MESSAGE_ID_LEN - 1], 2);
}

#[tokio::test]
async fn test_receive_wait_expires_with_no_message() {
    let transport = broker_with_queue();
    let conn = transport
        .connect(QUEUE_MANAGER, &demo_credentials())
        .await
        .expect("connect");
    let mut receiver = conn
        .open_for_receive(QUEUE)
        .await
        .expect("open_for_receive");

    let err = receiver.receive(SHORT_WAIT).await.unwrap_err();
    assert!(matches!(err, TransportError::NoMessage(20)));
}

#[tokio::test]
async fn test_connect_to_unknown_queue_manager_fails() {
    let transport = broker_with_queue();
    let err = transport
        .connect("QM9", &demo_credentials())
        .await
        .err()
        .expect("connect should fail");
    assert!(matches!(err, TransportError::Unavailable(name) if name == "QM9"));
}

#[tokio::test]
async fn test_connect_with_wrong_credentials_fails() {
    let transport = MemoryTransport::with_options(QUEUE_MANAGER, Some(demo_credentials()), 4096);
    transport.declare_queue(QUEUE);

    let wrong = Credentials {
        username: "app".into(),
        password: "nope".into(),
    };
    let err = transport
        .connect(QUEUE_MANAGER, &wrong)
        .await
        .err()
        .expect("connect should fail");
    assert!(matches!(err, TransportError::Auth(user) if user == "app"));
}

#[tokio::test]
async fn test_open_undeclared_queue_fails() {
    let transport = broker_with_queue();
    let conn = transport
        .connect(QUEUE_MANAGER, &demo_credentials())
        .await
        .expect("connect");
    let err = conn
        .open_for_receive("DEV.MISSING")
        .await
        .err()
        .expect("open should fail");
    assert!(matches!(err, TransportError::NotFound(name) if name == "DEV.MISSING"));
}

#[tokio::test]
async fn test_oversized_message_is_reported_truncated_and_left_queued() {
    let transport = MemoryTransport::with_options(QUEUE_MANAGER, None, 8);
    transport.declare_queue(QUEUE);
    let conn = transport
        .connect(QUEUE_MANAGER, &demo_credentials())
        .await
        .expect("connect");

    let mut sender = conn.open_for_send(QUEUE).await.expect("open_for_send");
    sender.send(b"twenty bytes of body").await.expect("send");

    let mut receiver = conn
        .open_for_receive(QUEUE)
        .await
        .expect("open_for_receive");
    let err = receiver.receive(SHORT_WAIT).await.unwrap_err();
    assert!(matches!(err, TransportError::Truncated { len: 20, max: 8 }));

    // The message was not consumed by the failed get.
    let err = receiver.receive(SHORT_WAIT).await.unwrap_err();
    assert!(matches!(err, TransportError::Truncated { len: 20, max: 8 }));
}

#[tokio::test]
async fn test_receive_picks_up_a_send_that_arrives_mid_wait() {
    let transport = broker_with_queue();
    let conn = transport
        .connect(QUEUE_MANAGER, &demo_credentials())
        .await
        .expect("connect");
    let mut receiver = conn
        .open_for_receive(QUEUE)
        .await
        .expect("open_for_receive");

    let sender_conn = transport
        .connect(QUEUE_MANAGER, &demo_credentials())
        .await
        .expect("connect");
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        let mut sender = sender_conn
            .open_for_send(QUEUE)
            .await
            .expect("open_for_send");
        sender.send(b"late arrival").await.expect("send");
    });

    let delivery = receiver
        .receive(Duration::from_millis(500))
        .await
        .expect("receive");
    assert_eq!(&delivery.body[..], b"late arrival");
}

#[test]
fn test_message_id_hex_rendering() {
    let mut bytes = [0u8; MESSAGE_ID_LEN];
    bytes[0] = 0x00;
    bytes[1] = 0xab;
    bytes[2] = 0x0f;
    let id = MessageId(bytes);
    let hex = id.to_hex();
    assert_eq!(hex.len(), MESSAGE_ID_LEN * 2);
    assert!(hex.starts_with("00ab0f"));
    assert!(hex.ends_with("000000"));
}
