//! Test utilities for smarthome-client
//!
//! [`TestServer`] serves an axum router on an ephemeral port and hands out a
//! connected client. [`MockHome`] is an in-memory stand-in for the SmartHome
//! server covering every endpoint the client talks to.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use tokio::net::TcpListener;

use crate::streaming::Event;
use crate::types::{Device, Metrics, ServerStatus};
use crate::{Result, SmartHomeClient};

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: SmartHomeClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Create a new test server from an axum Router
    ///
    /// # Example
    ///
    /// ```ignore
    /// use smarthome_client::testing::{MockHome, TestServer};
    ///
    /// let server = TestServer::start(MockHome::new().router()).await?;
    /// let devices = server.client.list_devices().await?;
    /// ```
    pub async fn start(router: Router) -> Result<Self> {
        Self::start_with_timeout(router, Duration::from_secs(5), Duration::from_secs(2)).await
    }

    /// Create a new test server with custom timeouts
    pub async fn start_with_timeout(
        router: Router,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        // Spawn the server
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let base_url = format!("http://{}", addr);
        let client = SmartHomeClient::with_config(&base_url, timeout, connect_timeout)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// =============================================================================
// Mock SmartHome server
// =============================================================================

struct MockState {
    status: ServerStatus,
    /// `None` makes `/api/metrics` answer 500
    metrics: Option<Metrics>,
    devices: Vec<Device>,
    /// Raw body served by `/api/events/stream`
    stream_body: String,
    /// Expected `Authorization` header value, if auth is enforced
    authorization: Option<String>,
}

/// In-memory SmartHome server
///
/// Clones share state, so a test can keep a handle and inspect devices after
/// the router has served requests.
#[derive(Clone)]
pub struct MockHome {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockHome {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHome {
    /// Server with MQTT down, a lamp (off) and a fan (on), and an empty stream
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                status: ServerStatus {
                    mqtt_available: false,
                    mqtt_broker: "localhost".to_string(),
                    mqtt_port: 1883,
                    recommended_mode: "sse".to_string(),
                    sse_clients_count: 0,
                },
                metrics: Some(Metrics {
                    temp: 21.5,
                    humidity: 40.0,
                    power: 120.0,
                    ts: None,
                }),
                devices: vec![
                    Device::new("lamp", "Living Room Lamp", false),
                    Device::new("fan", "Ceiling Fan", true),
                ],
                stream_body: String::new(),
                authorization: None,
            })),
        }
    }

    pub fn with_status(self, status: ServerStatus) -> Self {
        self.state.lock().status = status;
        self
    }

    pub fn with_metrics(self, metrics: Option<Metrics>) -> Self {
        self.state.lock().metrics = metrics;
        self
    }

    pub fn with_devices(self, devices: Vec<Device>) -> Self {
        self.state.lock().devices = devices;
        self
    }

    /// Serve `body` verbatim from the event stream, then close the connection
    pub fn with_stream_body(self, body: impl Into<String>) -> Self {
        self.state.lock().stream_body = body.into();
        self
    }

    /// Serve each event as a `data:` frame, then close the connection
    pub fn with_events(self, events: &[Event]) -> Self {
        let body = events
            .iter()
            .filter_map(|e| serde_json::to_string(e).ok())
            .map(|json| format!("data: {}\n\n", json))
            .collect::<String>();
        self.with_stream_body(body)
    }

    /// Reject requests whose `Authorization` header is not exactly `value`
    pub fn require_authorization(self, value: impl Into<String>) -> Self {
        self.state.lock().authorization = Some(value.into());
        self
    }

    /// Current device list
    pub fn devices(&self) -> Vec<Device> {
        self.state.lock().devices.clone()
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(mock_status))
            .route("/api/metrics", get(mock_metrics))
            .route("/api/devices", get(mock_devices))
            .route("/api/devices/{id}/toggle", post(mock_toggle))
            .route("/api/events/stream", get(mock_stream))
            .with_state(self.clone())
    }

    fn check_auth(&self, headers: &HeaderMap) -> std::result::Result<(), Response> {
        let state = self.state.lock();
        let Some(expected) = state.authorization.as_deref() else {
            return Ok(());
        };

        match headers.get(header::AUTHORIZATION).map(|v| v.to_str()) {
            Some(Ok(actual)) if actual == expected => Ok(()),
            Some(_) => Err(detail(StatusCode::FORBIDDEN, "Access denied")),
            None => Err(detail(StatusCode::UNAUTHORIZED, "Not authenticated")),
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "detail": message }))).into_response()
}

async fn mock_status(State(home): State<MockHome>, headers: HeaderMap) -> Response {
    if let Err(rejection) = home.check_auth(&headers) {
        return rejection;
    }
    Json(home.state.lock().status.clone()).into_response()
}

async fn mock_metrics(State(home): State<MockHome>, headers: HeaderMap) -> Response {
    if let Err(rejection) = home.check_auth(&headers) {
        return rejection;
    }
    match home.state.lock().metrics.clone() {
        Some(metrics) => Json(metrics).into_response(),
        None => detail(StatusCode::INTERNAL_SERVER_ERROR, "Metrics unavailable"),
    }
}

async fn mock_devices(State(home): State<MockHome>, headers: HeaderMap) -> Response {
    if let Err(rejection) = home.check_auth(&headers) {
        return rejection;
    }
    Json(home.devices()).into_response()
}

async fn mock_toggle(
    State(home): State<MockHome>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = home.check_auth(&headers) {
        return rejection;
    }

    let mut state = home.state.lock();
    match state.devices.iter_mut().find(|d| d.id == id) {
        Some(device) => {
            device.is_on = !device.is_on;
            Json(device.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Device not found"),
    }
}

async fn mock_stream(State(home): State<MockHome>, headers: HeaderMap) -> Response {
    if let Err(rejection) = home.check_auth(&headers) {
        return rejection;
    }
    let body = home.state.lock().stream_body.clone();
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}
