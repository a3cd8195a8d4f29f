//! SmartHome Client Library
//!
//! Provides a typed HTTP client for the SmartHome REST API and a line-based
//! reader for its server-sent-events stream.
//!
//! # Example
//!
//! ```rust,no_run
//! use smarthome_client::SmartHomeClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smarthome_client::SmartHomeError> {
//!     let client = SmartHomeClient::new("http://127.0.0.1:8000")?;
//!
//!     let status = client.status().await?;
//!     println!("MQTT available: {}", status.mqtt_available);
//!
//!     for device in client.list_devices().await? {
//!         println!("{} ({}): {}", device.name, device.id, device.is_on);
//!     }
//!
//!     let lamp = client.toggle_device("lamp").await?;
//!     println!("lamp is now {}", if lamp.is_on { "on" } else { "off" });
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module provides a mock server and a harness for
//! integration tests:
//!
//! ```rust,ignore
//! use smarthome_client::testing::{MockHome, TestServer};
//!
//! let server = TestServer::start(MockHome::new().router()).await?;
//! let metrics = server.client.metrics().await?;
//! ```

mod client;
mod error;
pub mod streaming;
pub mod testing;
mod types;

pub use client::{Credentials, SmartHomeClient, DEFAULT_BASE_URL};
pub use error::{Result, SmartHomeError};
pub use types::*;

// Re-export streaming types for convenience
pub use streaming::{Event, EventLines, StreamError, TopicKind};
