//! Request and response types for the SmartHome API

use serde::{Deserialize, Serialize};

// =============================================================================
// Status
// =============================================================================

/// Capability summary returned by `GET /api/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Whether the server currently reaches its MQTT broker
    pub mqtt_available: bool,
    pub mqtt_broker: String,
    pub mqtt_port: u16,
    /// Mode the server recommends for clients ("mqtt" or "sse")
    pub recommended_mode: String,
    /// Number of clients attached to the event stream
    pub sse_clients_count: u32,
}

impl ServerStatus {
    /// Broker address as `host:port`
    pub fn broker_address(&self) -> String {
        format!("{}:{}", self.mqtt_broker, self.mqtt_port)
    }
}

// =============================================================================
// Devices
// =============================================================================

/// A device as reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "isOn")]
    pub is_on: bool,
    #[serde(default, rename = "lastSeen", skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
}

impl Device {
    /// Create a device with no `lastSeen` information
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_on: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_on,
            last_seen: None,
        }
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Sensor readings returned by `GET /api/metrics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Temperature in °C
    pub temp: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Power draw in W
    pub power: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

// =============================================================================
// Event payloads
// =============================================================================

/// Payload of the `system/initial-state` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialState {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(alias = "detail")]
    pub error: String,
}
