//! Startup and shutdown sequencing of the supervisor.

mod helpers;

use std::sync::Arc;

use assistant_bridge::nostr::direct_message_kind;
use assistant_bridge::relay::RelayError;
use assistant_bridge::{Supervisor, SupervisorError};
use helpers::{config_for, direct_message, read_reply, MockBackend, MockTransport};
use nostr::Keys;

#[tokio::test]
async fn connect_failure_is_fatal() {
    let transport = Arc::new(MockTransport::new());
    transport.fail_connect();
    let assistant = Keys::generate();

    let supervisor = Supervisor::with_collaborators(
        config_for(&[assistant]),
        transport.clone(),
        Arc::new(MockBackend::new()),
    )
    .unwrap();

    let result = supervisor.run(std::future::pending()).await;

    assert!(matches!(
        result,
        Err(SupervisorError::Relay(RelayError::Connection { .. }))
    ));
    assert!(transport.filters().is_empty());
}

#[tokio::test]
async fn subscription_failure_closes_transport() {
    // No inbox: subscribe fails
    let transport = Arc::new(MockTransport::new());
    let supervisor = Supervisor::with_collaborators(
        config_for(&[Keys::generate()]),
        transport.clone(),
        Arc::new(MockBackend::new()),
    )
    .unwrap();

    let result = supervisor.run(std::future::pending()).await;

    assert!(matches!(
        result,
        Err(SupervisorError::Relay(RelayError::Subscription(_)))
    ));
    assert!(transport.is_closed());
}

#[tokio::test]
async fn answers_messages_until_stream_ends() {
    let (transport, inbox) = MockTransport::with_inbox();
    let transport = Arc::new(transport);
    let assistant = Keys::generate();
    let assistant_pk = assistant.public_key();

    let supervisor = Supervisor::with_collaborators(
        config_for(&[assistant]),
        transport.clone(),
        Arc::new(MockBackend::new()),
    )
    .unwrap();

    let user = Keys::generate();
    inbox
        .send(direct_message(&user, &assistant_pk, "hello"))
        .await
        .unwrap();
    drop(inbox);

    let stats = supervisor.run(std::future::pending()).await.unwrap();

    assert_eq!(stats.replied, 1);
    let published = transport.published();
    assert_eq!(read_reply(&user, &published[0]), "hello");
    assert_eq!(transport.close_calls(), 1);

    let filters = transport.filters();
    assert_eq!(filters.len(), 1);
    assert!(filters[0]
        .kinds
        .as_ref()
        .is_some_and(|kinds| kinds.contains(&direct_message_kind())));
    assert!(filters[0].since.is_some());
}

#[tokio::test]
async fn shutdown_signal_stops_and_closes() {
    let (transport, _inbox) = MockTransport::with_inbox();
    let transport = Arc::new(transport);

    let supervisor = Supervisor::with_collaborators(
        config_for(&[Keys::generate()]),
        transport.clone(),
        Arc::new(MockBackend::new()),
    )
    .unwrap();

    let stats = supervisor.run(std::future::ready(())).await.unwrap();

    assert_eq!(stats.dispatched, 0);
    assert!(transport.is_closed());
}

#[tokio::test]
async fn shutdown_while_connecting_stops_cleanly() {
    let transport = Arc::new(MockTransport::new());
    transport.stall_connect();

    let supervisor = Supervisor::with_collaborators(
        config_for(&[Keys::generate()]),
        transport.clone(),
        Arc::new(MockBackend::new()),
    )
    .unwrap();

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        supervisor.run(std::future::ready(())),
    )
    .await
    .expect("run should return once shutdown resolves");

    let stats = result.unwrap();
    assert_eq!(stats.dispatched, 0);
    assert!(transport.filters().is_empty());
    assert!(transport.is_closed());
}
