//! Broadcast Integration Tests
//!
//! Runs a hub host in-process and drives dispatchers against it over real
//! WebSocket connections. Dispatch blocks while connecting, so it runs on
//! the blocking pool.
//!
//! Run with: cargo test -p integration-tests --test broadcast_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::{
    closed_port_address, group_name, info_event, local_config, remote_config, wait_until,
    TestListener, TestServer, TEST_HUB,
};
use logcast_appender::{
    BroadcastConfig, BroadcastDispatcher, BroadcastLayer, ConnectionState, DeliveryRoute,
    DispatchObserver,
};
use logcast_core::{EventEnvelope, GroupName, HubMessage, LoggingEventData, OpCode};
use serde_json::{json, Value};
use tracing_subscriber::prelude::*;

/// Run a closure against the dispatcher on the blocking pool
async fn blocking<F, T>(dispatcher: &Arc<BroadcastDispatcher>, f: F) -> T
where
    F: FnOnce(&BroadcastDispatcher) -> T + Send + 'static,
    T: Send + 'static,
{
    let dispatcher = Arc::clone(dispatcher);
    tokio::task::spawn_blocking(move || f(&dispatcher))
        .await
        .expect("blocking task panicked")
}

// ============================================================================
// Hub Host Tests
// ============================================================================

#[tokio::test]
async fn test_listener_receives_hello() {
    let server = TestServer::start().await.expect("Failed to start server");
    let listener = TestListener::connect(&server.hub_url(TEST_HUB))
        .await
        .expect("Failed to connect");

    assert_eq!(listener.heartbeat_interval, 45_000);
}

#[tokio::test]
async fn test_listen_is_acknowledged_and_registered() {
    let server = TestServer::start().await.expect("Failed to start server");
    let _listener = TestListener::listen(&server.hub_url(TEST_HUB), Some("ops"))
        .await
        .expect("Failed to listen");

    let hub = server.registry.get(TEST_HUB).expect("hub created on connect");
    assert_eq!(hub.listener_count(), 1);
    assert_eq!(hub.member_count(&group_name("ops")), 1);
}

#[tokio::test]
async fn test_heartbeat_is_acknowledged() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut listener = TestListener::connect(&server.hub_url(TEST_HUB))
        .await
        .expect("Failed to connect");

    listener.send(&HubMessage::heartbeat()).await.unwrap();
    let ack = listener.recv(Duration::from_secs(5)).await.unwrap();
    assert_eq!(ack.op, OpCode::HeartbeatAck);
}

#[tokio::test]
async fn test_unknown_method_closes_session() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut listener = TestListener::connect(&server.hub_url(TEST_HUB))
        .await
        .expect("Failed to connect");

    listener
        .send(&HubMessage::invoke("NoSuchMethod", vec![]))
        .await
        .unwrap();

    assert!(listener.recv(Duration::from_secs(5)).await.is_err());
}

#[tokio::test]
async fn test_hubs_are_released_with_their_last_listener() {
    let server = TestServer::start().await.expect("Failed to start server");

    for i in 0..20 {
        let listener = TestListener::connect(&server.hub_url(&format!("junk{i}")))
            .await
            .expect("Failed to connect");
        drop(listener);
    }

    let registry = server.registry.clone();
    assert!(wait_until(Duration::from_secs(5), || registry.is_empty()).await);
}

#[tokio::test]
async fn test_hub_survives_while_a_listener_remains() {
    let server = TestServer::start().await.expect("Failed to start server");
    let _staying = TestListener::listen(&server.hub_url(TEST_HUB), Some("ops"))
        .await
        .unwrap();
    let leaving = TestListener::connect(&server.hub_url(TEST_HUB)).await.unwrap();
    drop(leaving);

    let registry = server.registry.clone();
    assert!(
        wait_until(Duration::from_secs(5), || {
            registry.get(TEST_HUB).is_some_and(|hub| hub.listener_count() == 1)
        })
        .await
    );
}

// ============================================================================
// Remote Dispatch Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remote_dispatch_reaches_group_member() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut member = TestListener::listen(&server.hub_url(TEST_HUB), Some("G1"))
        .await
        .unwrap();
    let mut outsider = TestListener::listen(&server.hub_url(TEST_HUB), Some("G2"))
        .await
        .unwrap();

    let dispatcher = Arc::new(BroadcastDispatcher::new(remote_config(&server.base_url(), "G1")));
    blocking(&dispatcher, |d| {
        d.dispatch_formatted("disk low", json!({"free_mb": 12}));
    })
    .await;

    let event = member.next_event().await.unwrap();
    assert_eq!(event.formatted_event, "disk low");
    assert_eq!(event.logging_event, json!({"free_mb": 12}));
    assert_eq!(event.id, 1);

    outsider.expect_silence().await.unwrap();
    assert_eq!(dispatcher.connection_state(), ConnectionState::Connected);
    assert_eq!(dispatcher.stats().sent_remote, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_push_is_three_element_array() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut member = TestListener::listen(&server.hub_url(TEST_HUB), None)
        .await
        .unwrap();

    let dispatcher = Arc::new(BroadcastDispatcher::new(
        BroadcastConfig::remote(server.base_url()).with_hub_name(TEST_HUB),
    ));
    blocking(&dispatcher, |d| d.dispatch(info_event("hello"))).await;

    let text = member.next_text(Duration::from_secs(5)).await.unwrap();
    let frame: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(frame["op"], 0);
    assert_eq!(frame["t"], "onLoggedEvent");

    let push = frame["d"].as_array().expect("push is an array");
    assert_eq!(push.len(), 3);
    assert!(push[0].as_str().unwrap().ends_with("INFO integration::app - hello"));
    assert_eq!(push[1]["message"], "hello");
    assert_eq!(push[2], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remote_sequence_is_ordered() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut member = TestListener::listen(&server.hub_url(TEST_HUB), Some("G1"))
        .await
        .unwrap();

    let dispatcher = Arc::new(BroadcastDispatcher::new(remote_config(&server.base_url(), "G1")));
    blocking(&dispatcher, |d| {
        for i in 0..20 {
            d.dispatch(info_event(&format!("event {i}")));
        }
    })
    .await;

    for expected in 1..=20u64 {
        let event = member.next_event().await.unwrap();
        assert_eq!(event.id, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_leave_stops_delivery() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut member = TestListener::listen(&server.hub_url(TEST_HUB), Some("G1"))
        .await
        .unwrap();

    let dispatcher = Arc::new(BroadcastDispatcher::new(remote_config(&server.base_url(), "G1")));
    blocking(&dispatcher, |d| d.dispatch(info_event("before"))).await;
    assert_eq!(member.next_event().await.unwrap().id, 1);

    member
        .send(&HubMessage::leave(&group_name("G1")))
        .await
        .unwrap();
    let hub = server.registry.hub(TEST_HUB);
    let group = group_name("G1");
    assert!(wait_until(Duration::from_secs(5), || hub.member_count(&group) == 0).await);

    blocking(&dispatcher, |d| d.dispatch(info_event("after"))).await;
    member.expect_silence().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_remote_is_silent() {
    let address = closed_port_address().await.unwrap();
    let config = BroadcastConfig {
        connect_timeout: Duration::from_secs(2),
        ..BroadcastConfig::remote(address)
    };
    let dispatcher = Arc::new(BroadcastDispatcher::new(config));

    blocking(&dispatcher, |d| d.dispatch(info_event("lost"))).await;

    assert_eq!(dispatcher.connection_state(), ConnectionState::Faulted);
    let stats = dispatcher.stats();
    assert_eq!(stats.dispatched, 1);
    assert_eq!(stats.dropped, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_close_then_dispatch_reconnects() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut member = TestListener::listen(&server.hub_url(TEST_HUB), Some("G1"))
        .await
        .unwrap();

    let dispatcher = Arc::new(BroadcastDispatcher::new(remote_config(&server.base_url(), "G1")));
    blocking(&dispatcher, |d| d.dispatch(info_event("first"))).await;
    assert_eq!(member.next_event().await.unwrap().id, 1);

    dispatcher.close();
    dispatcher.close();
    assert_eq!(dispatcher.connection_state(), ConnectionState::Disconnected);

    blocking(&dispatcher, |d| d.dispatch(info_event("second"))).await;
    assert_eq!(member.next_event().await.unwrap().id, 2);
}

// ============================================================================
// In-Process Dispatch Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_local_dispatch_through_shared_registry() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut member = TestListener::listen(&server.hub_url(TEST_HUB), Some("G1"))
        .await
        .unwrap();

    let dispatcher = Arc::new(
        BroadcastDispatcher::builder(local_config("G1"))
            .registry(server.registry.clone())
            .build(),
    );
    let route = Arc::new(RouteObserver::default());
    dispatcher.register_observer(route.clone());

    dispatcher.dispatch(info_event("in process"));

    let event = member.next_event().await.unwrap();
    assert_eq!(event.logging_event["message"], "in process");
    assert_eq!(route.last(), Some(DeliveryRoute::Local { listeners: 1 }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_layer_broadcasts_tracing_events() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut member = TestListener::listen(&server.hub_url(TEST_HUB), Some("G1"))
        .await
        .unwrap();

    let config = remote_config(&server.base_url(), "G1");
    tokio::task::spawn_blocking(move || {
        let dispatcher = Arc::new(BroadcastDispatcher::new(config));
        let subscriber = tracing_subscriber::registry().with(BroadcastLayer::new(dispatcher));
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "billing", invoice = 7, "payment failed");
        });
    })
    .await
    .unwrap();

    let event = member.next_event().await.unwrap();
    let data: LoggingEventData = serde_json::from_value(event.logging_event).unwrap();
    assert_eq!(data.level, "ERROR");
    assert_eq!(data.logger_name, "billing");
    assert_eq!(data.message, "payment failed");
    assert_eq!(data.fields["invoice"], 7);
}

/// Observer remembering the last route taken
#[derive(Default)]
struct RouteObserver {
    last: std::sync::Mutex<Option<DeliveryRoute>>,
}

impl RouteObserver {
    fn last(&self) -> Option<DeliveryRoute> {
        *self.last.lock().unwrap()
    }
}

impl DispatchObserver for RouteObserver {
    fn on_sent(&self, _envelope: &EventEnvelope, _group: &GroupName, route: DeliveryRoute) {
        *self.last.lock().unwrap() = Some(route);
    }
}
