//! Stream command - consume the server-sent event stream

use std::future::Future;

use futures::{Stream, StreamExt};
use smarthome_client::streaming::{decode_line, StreamResult};
use smarthome_client::{Event, SmartHomeClient, SmartHomeError, StreamError};
use tracing::{debug, warn};

use crate::output::{EventSink, OutputContext, OutputFormat};
use crate::render::render_event;

/// Why the consumer stopped
#[derive(Debug)]
pub enum StreamOutcome {
    /// The server closed the connection
    Closed,
    /// The shutdown future completed (Ctrl+C)
    Cancelled,
    /// The connection failed mid-stream
    Failed(StreamError),
}

/// What happened while consuming a stream
#[derive(Debug)]
pub struct StreamReport {
    pub outcome: StreamOutcome,
    /// Events decoded and rendered
    pub events: usize,
    /// Lines or events that were reported and skipped
    pub warnings: usize,
}

/// Connect to the event stream and print events until Ctrl+C or the server
/// closes the connection
pub async fn stream(client: &SmartHomeClient, ctx: &OutputContext) {
    ctx.heading("📡 SSE CLIENT");

    match client.stream_url() {
        Ok(url) => ctx.info(&format!("Connecting to {}...\n", url)),
        Err(e) => {
            ctx.error(&format!("❌ Connection error: {}", e));
            return;
        }
    }

    // Ctrl+C also covers the wait for response headers
    let shutdown = interrupted();
    tokio::pin!(shutdown);

    let connected = tokio::select! {
        biased;

        _ = &mut shutdown => None,
        result = client.open_event_stream() => Some(result),
    };

    let lines = match connected {
        None => {
            ctx.info("\n🛑 Client stopped by user");
            return;
        }
        Some(Ok(lines)) => lines,
        Some(Err(SmartHomeError::StreamError(StreamError::Server { status, message }))) => {
            ctx.error(&format!("❌ Connection failed: {} {}", status, message));
            return;
        }
        Some(Err(e)) => {
            ctx.error(&format!("❌ Connection error: {}", e));
            return;
        }
    };

    ctx.success("✅ Connected to SSE stream\n");

    let mut sink = ctx;
    let report = consume(lines, &mut shutdown, ctx.format, &mut sink).await;
    debug!(
        "Stream finished after {} events, {} warnings",
        report.events, report.warnings
    );

    match report.outcome {
        StreamOutcome::Closed => ctx.info("🔌 Stream closed by server"),
        StreamOutcome::Cancelled => ctx.info("\n🛑 Client stopped by user"),
        StreamOutcome::Failed(e) => ctx.error(&format!("❌ Connection error: {}", e)),
    }
}

/// Resolves on Ctrl+C; never resolves if the signal cannot be hooked
pub async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Drive a line stream to completion, rendering each event into `sink`
///
/// Decode failures are reported as warnings and skipped. The loop ends when
/// the stream ends, when it yields a non-recoverable error, or when
/// `shutdown` completes. The stream is dropped on return, which closes the
/// underlying connection.
pub async fn consume<S, F, K>(
    mut lines: S,
    shutdown: F,
    format: OutputFormat,
    sink: &mut K,
) -> StreamReport
where
    S: Stream<Item = StreamResult<String>> + Unpin,
    F: Future<Output = ()>,
    K: EventSink,
{
    tokio::pin!(shutdown);

    let mut events = 0;
    let mut warnings = 0;

    let outcome = loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break StreamOutcome::Cancelled,

            line = lines.next() => match line {
                Some(Ok(line)) => match decode_line(&line) {
                    None => {}
                    Some(Ok(event)) => {
                        emit(&event, format, sink);
                        events += 1;
                    }
                    Some(Err(e)) => {
                        debug!("{}", e);
                        sink.warning(&format!("⚠️  Failed to parse JSON: {}", line));
                        warnings += 1;
                    }
                },
                Some(Err(e)) if e.is_recoverable() => {
                    sink.warning(&format!("⚠️  Failed to read line: {}", e));
                    warnings += 1;
                }
                Some(Err(e)) => break StreamOutcome::Failed(e),
                None => break StreamOutcome::Closed,
            },
        }
    };

    StreamReport {
        outcome,
        events,
        warnings,
    }
}

fn emit<K: EventSink>(event: &Event, format: OutputFormat, sink: &mut K) {
    match format {
        OutputFormat::Text => {
            for line in render_event(event) {
                sink.event_line(&line);
            }
        }
        OutputFormat::Json => match serde_json::to_string(event) {
            Ok(json) => sink.event_line(&json),
            Err(e) => warn!("Failed to serialize event {}: {}", event.topic, e),
        },
    }
}
