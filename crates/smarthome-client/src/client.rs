//! SmartHome HTTP client implementation

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Result, SmartHomeError};
use crate::streaming::EventLines;
use crate::types::*;

/// Default base URL of the SmartHome server
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// URL-encode a device ID for use in a path segment.
fn encode_path_segment(id: &str) -> String {
    id.replace('%', "%25")
        .replace('/', "%2F")
        .replace('?', "%3F")
        .replace('#', "%23")
}

/// HTTP Basic credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// SmartHome REST API client
///
/// Request/response calls share one connection pool with a total request
/// timeout. The event stream uses a second client that only bounds the
/// connect phase, since the stream is expected to stay open indefinitely.
#[derive(Debug, Clone)]
pub struct SmartHomeClient {
    client: Client,
    stream_client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl SmartHomeClient {
    /// Create a new SmartHome client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the server (e.g., "http://127.0.0.1:8000")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new SmartHome client with custom timeouts
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let stream_client = Client::builder().connect_timeout(connect_timeout).build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self {
            client,
            stream_client,
            base_url,
            credentials: None,
        })
    }

    /// Send HTTP Basic credentials with every request, including the stream
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether requests carry Basic credentials
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Fetch the server capability summary
    #[instrument(skip(self))]
    pub async fn status(&self) -> Result<ServerStatus> {
        self.get("/api/status").await
    }

    // =========================================================================
    // Metrics
    // =========================================================================

    /// Fetch the latest sensor readings
    #[instrument(skip(self))]
    pub async fn metrics(&self) -> Result<Metrics> {
        self.get("/api/metrics").await
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// List all devices
    #[instrument(skip(self))]
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        self.get("/api/devices").await
    }

    /// Flip a device on/off and return its new state
    ///
    /// Not idempotent: every call flips the state again.
    #[instrument(skip(self))]
    pub async fn toggle_device(&self, device_id: &str) -> Result<Device> {
        let path = format!("/api/devices/{}/toggle", encode_path_segment(device_id));
        let response = self.request(Method::POST, &path)?.send().await?;

        match self.handle_response(response).await {
            Err(SmartHomeError::ServerError { status: 404, .. }) => {
                Err(SmartHomeError::DeviceNotFound(device_id.to_string()))
            }
            other => other,
        }
    }

    // =========================================================================
    // Event stream
    // =========================================================================

    /// URL of the event stream
    pub fn stream_url(&self) -> Result<Url> {
        Ok(self.base_url.join("/api/events/stream")?)
    }

    /// Open the event stream
    ///
    /// Resolves once the response headers arrive; the returned [`EventLines`]
    /// then yields the body line by line.
    pub async fn open_event_stream(&self) -> Result<EventLines> {
        let url = self.stream_url()?;
        debug!("Connecting to event stream: {}", url);

        Ok(EventLines::connect(self.authorize(self.stream_client.get(url))).await?)
    }

    // =========================================================================
    // Generic access
    // =========================================================================

    /// GET an arbitrary endpoint and deserialize the JSON body
    #[instrument(skip(self))]
    pub async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.request(Method::GET, endpoint)?.send().await?;
        self.handle_response(response).await
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        debug!("{} {}", method, url);
        Ok(self.authorize(self.client.request(method, url)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(c) => request.basic_auth(&c.username, Some(&c.password)),
            None => request,
        }
    }

    /// Handle response and deserialize JSON
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| SmartHomeError::ParseError(e.to_string()))
        } else {
            Err(self.extract_error_from_status(response, status).await)
        }
    }

    async fn extract_error_from_status(
        &self,
        response: reqwest::Response,
        status: StatusCode,
    ) -> SmartHomeError {
        // Try to parse error response body
        let message = match response.json::<ErrorResponse>().await {
            Ok(err) => err.error,
            Err(_) => format!("HTTP {}", status),
        };

        match status {
            StatusCode::UNAUTHORIZED => SmartHomeError::Unauthorized(message),
            StatusCode::FORBIDDEN => SmartHomeError::Forbidden(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => SmartHomeError::Timeout,
            _ => SmartHomeError::server_error(status.as_u16(), message),
        }
    }
}
