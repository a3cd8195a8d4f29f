//! Types for the event stream

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::topic::TopicKind;

/// Shown instead of the time when an event carries no ISO-8601 timestamp
pub const TIMESTAMP_PLACEHOLDER: &str = "?";

/// An event pushed by the server over the SSE stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event category, e.g. `system/keepalive` or `home/livingroom/metrics`
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Topic specific body
    #[serde(default = "empty_payload")]
    pub payload: serde_json::Value,

    /// ISO-8601 timestamp set by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

fn default_topic() -> String {
    "unknown".to_string()
}

fn empty_payload() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Event {
    /// Create an event from its parts
    pub fn new(
        topic: impl Into<String>,
        payload: serde_json::Value,
        timestamp: Option<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload,
            timestamp,
        }
    }

    /// Display category of this event's topic
    pub fn kind(&self) -> TopicKind {
        TopicKind::classify(&self.topic)
    }

    /// Time portion of the timestamp (the segment after the first `T`, up to
    /// any further `T`), or [`TIMESTAMP_PLACEHOLDER`] if there is none
    pub fn display_time(&self) -> &str {
        self.timestamp
            .as_deref()
            .and_then(|ts| ts.split('T').nth(1))
            .unwrap_or(TIMESTAMP_PLACEHOLDER)
    }

    /// Get a payload field
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.payload.get(field)
    }

    /// Get a payload field as bool
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(|v| v.as_bool())
    }

    /// Get a payload field as string
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|v| v.as_str())
    }

    /// Deserialize the whole payload into a typed value
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.payload.clone()).ok()
    }
}

/// Errors that can occur during streaming
#[derive(Debug, Error)]
pub enum StreamError {
    /// HTTP/connection error
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// Failed to decode a line or its JSON body
    #[error("Parse error: {0}")]
    Parse(String),

    /// Server refused the stream
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl StreamError {
    /// Whether the stream can keep going after this error
    ///
    /// Only per-line decode failures are recoverable; anything else means the
    /// connection is gone.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

/// Result type for streaming operations
pub type StreamResult<T> = std::result::Result<T, StreamError>;
