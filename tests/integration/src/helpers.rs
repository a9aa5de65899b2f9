//! Test helpers for integration tests
//!
//! Provides a mock open platform serving the access token endpoint, the REST API and a
//! WebSocket gateway whose connections are driven from the test body.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bot_api::{ApiConfig, HttpApi};
use bot_common::{AppAccessTokenProvider, CredentialProvider};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::fixtures::{TEST_ACCESS_TOKEN, TEST_APP_ID, TEST_SECRET};

/// How long a helper waits for the client before failing the test
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A REST request recorded by the mock platform
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

enum ServerFrame {
    Json(Value),
    Close(u16),
}

struct PlatformState {
    ws_url: String,
    token_requests: AtomicUsize,
    accept: mpsc::UnboundedSender<MockConnection>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Mock open platform bound to an ephemeral local port
pub struct MockPlatform {
    pub addr: SocketAddr,
    state: Arc<PlatformState>,
    accepted: tokio::sync::Mutex<mpsc::UnboundedReceiver<MockConnection>>,
    _handle: JoinHandle<()>,
}

impl MockPlatform {
    /// Start the mock platform
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (accept, accepted) = mpsc::unbounded_channel();
        let state = Arc::new(PlatformState {
            ws_url: format!("ws://{addr}/websocket"),
            token_requests: AtomicUsize::new(0),
            accept,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/app/getAppAccessToken", post(access_token))
            .route("/gateway", get(gateway))
            .route("/websocket", get(websocket))
            .route("/v2/groups/:openid/messages", post(group_message))
            .with_state(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            accepted: tokio::sync::Mutex::new(accepted),
            _handle: handle,
        })
    }

    /// Base URL for REST calls
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn token_url(&self) -> String {
        format!("{}/app/getAppAccessToken", self.base_url())
    }

    pub fn gateway_url(&self) -> &str {
        &self.state.ws_url
    }

    /// Number of access token requests served
    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    /// Message requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Credential provider backed by this platform's token endpoint
    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        Arc::new(AppAccessTokenProvider::new(TEST_APP_ID, TEST_SECRET).with_endpoint(self.token_url()))
    }

    /// REST client pointed at this platform
    pub fn api(&self, credentials: Arc<dyn CredentialProvider>) -> Result<HttpApi> {
        let config = ApiConfig::new(TEST_APP_ID).with_origin(self.base_url());
        Ok(HttpApi::new(config, credentials)?)
    }

    /// Wait for the next gateway connection
    pub async fn accept(&self) -> Result<MockConnection> {
        let mut accepted = self.accepted.lock().await;
        tokio::time::timeout(WAIT_TIMEOUT, accepted.recv())
            .await
            .context("timed out waiting for a gateway connection")?
            .context("mock platform stopped")
    }

    /// Check that no connection arrives within `window`
    pub async fn expect_no_connection(&self, window: Duration) -> bool {
        let mut accepted = self.accepted.lock().await;
        tokio::time::timeout(window, accepted.recv()).await.is_err()
    }
}

/// Server side of one gateway connection
pub struct MockConnection {
    outgoing: mpsc::UnboundedSender<ServerFrame>,
    incoming: mpsc::UnboundedReceiver<Value>,
}

impl MockConnection {
    /// Send a JSON frame to the client
    pub fn send(&self, frame: Value) {
        let _ = self.outgoing.send(ServerFrame::Json(frame));
    }

    /// Close the connection with `code`
    pub fn close(&self, code: u16) {
        let _ = self.outgoing.send(ServerFrame::Close(code));
    }

    /// Next frame from the client; `None` once the client closed
    pub async fn recv(&mut self) -> Result<Option<Value>> {
        tokio::time::timeout(WAIT_TIMEOUT, self.incoming.recv())
            .await
            .context("timed out waiting for a client frame")
    }

    /// Next frame that is not a heartbeat, acknowledging heartbeats on the way
    pub async fn recv_control(&mut self) -> Result<Option<Value>> {
        loop {
            match self.recv().await? {
                Some(frame) if frame["op"] == 1 => self.send(json!({"op": 11})),
                other => return Ok(other),
            }
        }
    }

    /// Next heartbeat, skipping anything else
    pub async fn recv_heartbeat(&mut self) -> Result<Value> {
        loop {
            match self.recv().await? {
                Some(frame) if frame["op"] == 1 => return Ok(frame),
                Some(_) => {}
                None => anyhow::bail!("connection closed before a heartbeat"),
            }
        }
    }
}

async fn access_token(State(state): State<Arc<PlatformState>>, Json(body): Json<Value>) -> impl IntoResponse {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    if body["appId"] != TEST_APP_ID || body["clientSecret"] != TEST_SECRET {
        return Json(json!({"code": 100_016, "message": "invalid appid or secret"}));
    }

    Json(json!({"access_token": TEST_ACCESS_TOKEN, "expires_in": "7200"}))
}

async fn gateway(State(state): State<Arc<PlatformState>>) -> impl IntoResponse {
    Json(json!({"url": state.ws_url}))
}

async fn group_message(
    State(state): State<Arc<PlatformState>>,
    Path(openid): Path<String>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().push(RecordedRequest {
        path: format!("/v2/groups/{openid}/messages"),
        authorization,
        body,
    });

    Json(json!({"id": "reply-1", "timestamp": 1_700_000_000}))
}

async fn websocket(State(state): State<Arc<PlatformState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_connection(socket, state))
}

async fn serve_connection(mut socket: WebSocket, state: Arc<PlatformState>) {
    let (outgoing, mut server_frames) = mpsc::unbounded_channel();
    let (client_frames, incoming) = mpsc::unbounded_channel();

    if state.accept.send(MockConnection { outgoing, incoming }).is_err() {
        return;
    }

    loop {
        tokio::select! {
            frame = server_frames.recv() => match frame {
                Some(ServerFrame::Json(value)) => {
                    if socket.send(Message::Text(value.to_string())).await.is_err() {
                        break;
                    }
                }
                Some(ServerFrame::Close(code)) => {
                    let _ = socket
                        .send(Message::Close(Some(CloseFrame { code, reason: "".into() })))
                        .await;
                    break;
                }
                None => break,
            },
            message = socket.recv() => match message {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(value) = serde_json::from_str::<Value>(&text) {
                        let _ = client_frames.send(value);
                    }
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
