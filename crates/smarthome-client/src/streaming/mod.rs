//! Streaming support for the SmartHome event stream
//!
//! The server pushes events over SSE (Server-Sent Events) at
//! `/api/events/stream`. Reading is split in two steps:
//!
//! - [`EventLines`] turns the response body into a lazy stream of raw text lines
//! - [`decode_line`] is a pure function turning one `data:` line into an [`Event`]
//!
//! Keeping decoding separate means a malformed line never ends the stream; the
//! caller decides what to do with each `Err`.
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use smarthome_client::streaming::{decode_line, TopicKind};
//! use smarthome_client::SmartHomeClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SmartHomeClient::new("http://127.0.0.1:8000")?;
//! let mut lines = client.open_event_stream().await?;
//!
//! while let Some(line) = lines.next().await {
//!     let line = line?;
//!     match decode_line(&line) {
//!         Some(Ok(event)) if event.kind() == TopicKind::Keepalive => {
//!             println!("[{}] keepalive", event.display_time());
//!         }
//!         Some(Ok(event)) => println!("{}", event.topic),
//!         Some(Err(e)) => eprintln!("{}", e),
//!         None => {} // comment or other non-data line
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod lines;
mod parser;
mod topic;
mod types;

pub use lines::EventLines;
pub use parser::{data_field, decode_line, LineDecoder, DATA_MARKER, MAX_LINE_LENGTH};
pub use topic::{TopicKind, INITIAL_STATE_TOPIC, KEEPALIVE_TOPIC};
pub use types::{Event, StreamError, StreamResult, TIMESTAMP_PLACEHOLDER};
