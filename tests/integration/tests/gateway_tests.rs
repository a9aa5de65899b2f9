//! Gateway Integration Tests
//!
//! Drive the gateway client against the in-process mock platform: token endpoint,
//! `GET /gateway`, a WebSocket gateway and the group message endpoint.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::Arc;
use std::time::Duration;

use bot_api::{HttpApi, OutgoingMessage};
use bot_common::AppAccessTokenProvider;
use bot_core::EventName;
use bot_gateway::{CloseReason, DispatchEvent, DispatchRouter, GatewayClient, SessionHandle, SessionState};
use integration_tests::*;
use serde_json::{json, Value};
use tokio::sync::mpsc;

struct Harness {
    platform: MockPlatform,
    router: Arc<DispatchRouter>,
    api: HttpApi,
    client: GatewayClient,
}

async fn harness() -> Harness {
    let platform = MockPlatform::start().await.expect("Failed to start mock platform");
    let credentials = platform.credentials();
    let api = platform.api(Arc::clone(&credentials)).expect("Failed to build API client");
    let router = Arc::new(DispatchRouter::new());

    let client = GatewayClient::builder()
        .config(test_gateway_config())
        .credentials(credentials)
        .router(Arc::clone(&router))
        .build()
        .expect("Failed to build gateway client");

    Harness {
        platform,
        router,
        api,
        client,
    }
}

/// Forward payloads published under `name` into a channel
fn subscribe(router: &DispatchRouter, name: EventName) -> mpsc::UnboundedReceiver<Value> {
    let (tx, rx) = mpsc::unbounded_channel();
    router.on(name, move |event: DispatchEvent| {
        let _ = tx.send(event.payload().clone());
        async { anyhow::Ok(()) }
    });
    rx
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    tokio::time::timeout(WAIT_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("router dropped")
}

/// Connect, identify and become ready with sequence `seq`
async fn connect_ready(harness: &Harness, seq: u64) -> (SessionHandle, MockConnection) {
    let session = harness.client.connect(harness.platform.gateway_url());
    let mut conn = harness.platform.accept().await.unwrap();

    conn.send(hello(30_000));
    let identify = conn.recv_control().await.unwrap().expect("identify frame");
    assert_eq!(identify["op"], 2);

    conn.send(ready(seq));
    assert_eq!(session.wait_for_state(SessionState::Active).await, SessionState::Active);
    (session, conn)
}

async fn wait_for_sequence(session: &SessionHandle, seq: u64) {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        while session.snapshot().sequence != Some(seq) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("sequence never reached");
}

// ============================================================================
// Handshake Tests
// ============================================================================

#[tokio::test]
async fn test_gateway_url_from_rest() {
    let harness = harness().await;

    let gateway = harness.api.get_gateway().await.unwrap();
    assert_eq!(gateway.url, harness.platform.gateway_url());
}

#[tokio::test]
async fn test_fresh_identify_ready_and_heartbeat() {
    let harness = harness().await;
    let mut ready_events = subscribe(&harness.router, EventName::SessionReady);

    let session = harness.client.connect(harness.platform.gateway_url());
    let mut conn = harness.platform.accept().await.unwrap();

    conn.send(hello(30_000));
    let identify = conn.recv_control().await.unwrap().expect("identify frame");
    assert_eq!(identify["op"], 2);
    assert_eq!(identify["d"]["token"], TEST_AUTHORIZATION);
    assert_eq!(identify["d"]["intents"], test_intents().bits());
    assert_eq!(identify["d"]["shard"], json!([0, 1]));
    assert_eq!(identify["d"]["properties"], json!({}));

    conn.send(ready(1));
    let event = next_event(&mut ready_events).await;
    assert_eq!(event["t"], "READY");
    assert_eq!(event["session_id"], TEST_SESSION_ID);

    let heartbeat = conn.recv_heartbeat().await.unwrap();
    assert_eq!(heartbeat["d"], 1);
    conn.send(heartbeat_ack());

    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(session.snapshot().session_id.as_deref(), Some(TEST_SESSION_ID));
    assert_eq!(harness.platform.token_requests(), 1);

    session.disconnect();
    assert_eq!(session.closed().await, CloseReason::Requested);
}

// ============================================================================
// Reconnect Tests
// ============================================================================

#[tokio::test]
async fn test_resume_after_dropped_connection() {
    let harness = harness().await;
    let mut resumed_events = subscribe(&harness.router, EventName::SessionResumed);
    let (session, conn) = connect_ready(&harness, 1).await;

    conn.send(dispatch(2, "GUILD_CREATE", json!({"id": "guild-1"})));
    wait_for_sequence(&session, 2).await;

    // Internal server error code: resumable
    conn.close(4900);

    let mut conn = harness.platform.accept().await.unwrap();
    conn.send(hello(30_000));
    let resume = conn.recv_control().await.unwrap().expect("resume frame");
    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["session_id"], TEST_SESSION_ID);
    assert_eq!(resume["d"]["seq"], 2);
    assert_eq!(resume["d"]["token"], TEST_AUTHORIZATION);

    conn.send(resumed(3));
    let event = next_event(&mut resumed_events).await;
    assert_eq!(event["t"], "RESUMED");
    assert_eq!(session.wait_for_state(SessionState::Active).await, SessionState::Active);

    // Token renewed before reconnecting
    assert_eq!(harness.platform.token_requests(), 2);

    session.disconnect();
    session.closed().await;
}

#[tokio::test]
async fn test_invalid_session_reidentifies() {
    let harness = harness().await;
    let mut dead_events = subscribe(&harness.router, EventName::SessionDead);
    let (session, mut conn) = connect_ready(&harness, 5).await;

    conn.send(invalid_session());
    assert_eq!(conn.recv_control().await.unwrap(), None);

    let mut conn = harness.platform.accept().await.unwrap();
    conn.send(hello(30_000));
    let identify = conn.recv_control().await.unwrap().expect("identify frame");
    assert_eq!(identify["op"], 2);

    conn.send(ready(1));
    assert_eq!(session.wait_for_state(SessionState::Active).await, SessionState::Active);
    assert!(dead_events.try_recv().is_err());

    session.disconnect();
    session.closed().await;
}

#[tokio::test]
async fn test_reconnect_request_resumes() {
    let harness = harness().await;
    let (session, conn) = connect_ready(&harness, 3).await;

    conn.send(reconnect_request());

    let mut conn = harness.platform.accept().await.unwrap();
    conn.send(hello(30_000));
    let resume = conn.recv_control().await.unwrap().expect("resume frame");
    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["seq"], 3);

    session.disconnect();
    session.closed().await;
}

#[tokio::test]
async fn test_fatal_close_code_ends_session() {
    let harness = harness().await;
    let mut dead_events = subscribe(&harness.router, EventName::SessionDead);
    let (session, conn) = connect_ready(&harness, 1).await;

    // Bot banned: never retried
    conn.close(4915);

    assert_eq!(session.closed().await, CloseReason::Fatal { code: Some(4915) });
    let dead = next_event(&mut dead_events).await;
    assert_eq!(dead["reason"], "fatal close code 4915");
    assert!(harness.platform.expect_no_connection(Duration::from_millis(300)).await);
}

#[tokio::test]
async fn test_authentication_failure_renews_token() {
    let harness = harness().await;
    let (session, conn) = connect_ready(&harness, 1).await;
    assert_eq!(harness.platform.token_requests(), 1);

    conn.close(4004);

    let mut conn = harness.platform.accept().await.unwrap();
    conn.send(hello(30_000));
    let identify = conn.recv_control().await.unwrap().expect("identify frame");
    assert_eq!(identify["op"], 2);
    assert_eq!(identify["d"]["token"], TEST_AUTHORIZATION);
    assert_eq!(harness.platform.token_requests(), 2);

    // Rejected again before READY: the session stops
    conn.close(4004);
    assert_eq!(session.closed().await, CloseReason::Fatal { code: Some(4004) });
    assert!(harness.platform.expect_no_connection(Duration::from_millis(300)).await);
}

// ============================================================================
// Disconnect Tests
// ============================================================================

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let harness = harness().await;
    let mut dead_events = subscribe(&harness.router, EventName::SessionDead);
    let (session, mut conn) = connect_ready(&harness, 1).await;

    session.disconnect();
    session.disconnect();
    assert_eq!(session.closed().await, CloseReason::Requested);
    session.disconnect();

    assert_eq!(conn.recv_control().await.unwrap(), None);
    assert!(harness.platform.expect_no_connection(Duration::from_millis(300)).await);
    assert_eq!(session.state(), SessionState::Closed);
    assert!(dead_events.try_recv().is_err());
}

// ============================================================================
// Credential Tests
// ============================================================================

#[tokio::test]
async fn test_rejected_credentials_end_session() {
    let platform = MockPlatform::start().await.unwrap();
    let credentials = Arc::new(
        AppAccessTokenProvider::new(TEST_APP_ID, "wrong-secret").with_endpoint(platform.token_url()),
    );

    let client = GatewayClient::builder()
        .config(test_gateway_config())
        .credentials(credentials)
        .build()
        .unwrap();

    let session = client.connect(platform.gateway_url());
    let reason = tokio::time::timeout(WAIT_TIMEOUT, session.closed()).await.unwrap();

    assert!(matches!(reason, CloseReason::CredentialFailed(_)), "{reason:?}");
    assert!(platform.expect_no_connection(Duration::from_millis(200)).await);
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_group_message_routed_and_replied() {
    let harness = harness().await;
    let mut group_events = subscribe(&harness.router, EventName::Group);

    let (replied_tx, mut replied) = mpsc::unbounded_channel();
    let api = harness.api.clone();
    harness.router.on(EventName::GroupAtMessageCreate, move |event: DispatchEvent| {
        let api = api.clone();
        let replied_tx = replied_tx.clone();
        async move {
            let target = event.reply_target().cloned().ok_or_else(|| anyhow::anyhow!("no reply target"))?;
            let sent = api.reply(&target, OutgoingMessage::text("pong")).await?;
            let _ = replied_tx.send(json!({"id": sent.id}));
            anyhow::Ok(())
        }
    });

    let (session, conn) = connect_ready(&harness, 1).await;
    conn.send(group_at_message(2, "msg-1", "GROUP-1", "ping"));

    let event = next_event(&mut group_events).await;
    assert_eq!(event["t"], "GROUP_AT_MESSAGE_CREATE");
    assert_eq!(event["content"], "ping");

    let sent = next_event(&mut replied).await;
    assert_eq!(sent["id"], "reply-1");

    let requests = harness.platform.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v2/groups/GROUP-1/messages");
    assert_eq!(requests[0].authorization.as_deref(), Some(TEST_AUTHORIZATION));
    assert_eq!(requests[0].body["msg_id"], "msg-1");
    assert_eq!(requests[0].body["content"], "pong");

    session.disconnect();
    session.closed().await;
}
