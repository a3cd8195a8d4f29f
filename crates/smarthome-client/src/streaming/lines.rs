//! Line stream over an open SSE connection

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use reqwest::RequestBuilder;
use tracing::debug;

use super::parser::{decode_line, LineDecoder};
use super::types::{Event, StreamError, StreamResult};

/// Raw text lines read from the event stream
///
/// Implements `Stream<Item = Result<String, StreamError>>`. The stream is lazy,
/// potentially infinite and cannot be restarted; it yields `None` once the
/// server closes the connection. A transport error is yielded once and ends
/// the stream. Dropping the value closes the connection.
pub struct EventLines {
    /// The underlying byte stream
    byte_stream: BoxStream<'static, StreamResult<Bytes>>,

    /// Line framing state
    decoder: LineDecoder,

    /// Lines decoded but not yet handed out
    pending: VecDeque<StreamResult<String>>,

    /// Whether the byte stream has ended
    finished: bool,
}

impl EventLines {
    /// Send the stream request and wait for the response headers
    pub(crate) async fn connect(request: RequestBuilder) -> StreamResult<Self> {
        let response = request.header("Accept", "text/event-stream").send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StreamError::Server { status, message });
        }

        debug!("Connected to event stream");

        let byte_stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(StreamError::Connection));

        Ok(Self::from_byte_stream(byte_stream))
    }

    /// Wrap any byte stream, e.g. a canned one in tests
    pub fn from_byte_stream<S>(byte_stream: S) -> Self
    where
        S: Stream<Item = StreamResult<Bytes>> + Send + 'static,
    {
        Self {
            byte_stream: byte_stream.boxed(),
            decoder: LineDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Decoded events, skipping lines that carry none
    pub fn events(self) -> impl Stream<Item = StreamResult<Event>> + Send {
        self.filter_map(|line| async move {
            match line {
                Ok(line) => decode_line(&line),
                Err(e) => Some(Err(e)),
            }
        })
    }
}

impl Stream for EventLines {
    type Item = StreamResult<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(line) = this.pending.pop_front() {
                return Poll::Ready(Some(line));
            }

            if this.finished {
                return Poll::Ready(None);
            }

            match this.byte_stream.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.pending.extend(this.decoder.feed(&bytes));
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    debug!("Event stream ended");
                    this.finished = true;
                    if let Some(line) = this.decoder.finish() {
                        this.pending.push_back(line);
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn canned(chunks: Vec<StreamResult<Bytes>>) -> EventLines {
        EventLines::from_byte_stream(stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_lines_across_chunks() {
        let lines = canned(vec![
            Ok(Bytes::from_static(b"data: {\"topic\"")),
            Ok(Bytes::from_static(b":\"a\"}\n\n: ping\n")),
            Ok(Bytes::from_static(b"data: {}")),
        ]);

        let lines: Vec<String> = lines.map(|l| l.unwrap()).collect().await;
        assert_eq!(
            lines,
            vec!["data: {\"topic\":\"a\"}", "", ": ping", "data: {}"]
        );
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let mut lines = canned(vec![
            Ok(Bytes::from_static(b"one\n")),
            Err(StreamError::Server {
                status: 502,
                message: "Bad Gateway".into(),
            }),
            Ok(Bytes::from_static(b"never\n")),
        ]);

        assert_eq!(lines.next().await.unwrap().unwrap(), "one");
        assert!(matches!(
            lines.next().await,
            Some(Err(StreamError::Server { status: 502, .. }))
        ));
        assert!(lines.next().await.is_none());
    }

    #[tokio::test]
    async fn test_events_skip_non_data_lines() {
        let lines = canned(vec![Ok(Bytes::from_static(
            b": comment\nevent: message\ndata: {\"topic\":\"home/lamp/state\"}\n\ndata: oops\n",
        ))]);

        let events: Vec<StreamResult<Event>> = lines.events().collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap().topic, "home/lamp/state");
        assert!(matches!(events[1], Err(StreamError::Parse(_))));
    }
}
