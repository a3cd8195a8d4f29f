//! Demo command - status probe, API exercise, then the event stream

use smarthome_client::SmartHomeClient;

use crate::output::OutputContext;

/// Run every phase in order
///
/// Stops early, without error, when the status probe finds no server.
pub async fn demo(client: &SmartHomeClient, device_id: &str, ctx: &OutputContext) {
    ctx.banner("🏠 SmartHome - SSE Client Demo");

    if super::status(client, ctx).await.is_none() {
        ctx.error("\n❌ Server not available. Start the SmartHome server so it listens on:");
        ctx.error(&format!("   {}", client.base_url()));
        return;
    }

    super::api(client, device_id, ctx).await;

    ctx.info("\nStarting SSE client (press Ctrl+C to stop)...");
    super::stream(client, ctx).await;

    ctx.info("\n👋 Goodbye!");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use smarthome_client::testing::{MockHome, TestServer};
    use std::time::Duration;

    #[tokio::test]
    async fn test_runs_to_completion_when_stream_closes() {
        let home = MockHome::new().with_stream_body(": nothing to see\n");
        let server = TestServer::start(home.router()).await.unwrap();
        let ctx = OutputContext::new(OutputFormat::Json, true);

        tokio::time::timeout(Duration::from_secs(5), demo(&server.client, "lamp", &ctx))
            .await
            .unwrap();

        // The API phase ran before the stream phase
        assert!(home.devices().iter().any(|d| d.id == "lamp" && d.is_on));
    }

    #[tokio::test]
    async fn test_exits_early_without_server() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SmartHomeClient::new(&format!("http://{}", addr)).unwrap();
        let ctx = OutputContext::new(OutputFormat::Text, true);

        tokio::time::timeout(Duration::from_secs(5), demo(&client, "lamp", &ctx))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unavailable_status_skips_later_phases() {
        use axum::http::StatusCode;
        use axum::routing::{get, post};
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK
            }
        };
        let router = axum::Router::new()
            .route(
                "/api/status",
                get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            )
            .route("/api/metrics", get(counter(calls.clone())))
            .route("/api/devices", get(counter(calls.clone())))
            .route("/api/devices/{id}/toggle", post(counter(calls.clone())))
            .route("/api/events/stream", get(counter(calls.clone())));
        let server = TestServer::start(router).await.unwrap();
        let ctx = OutputContext::new(OutputFormat::Text, true);

        tokio::time::timeout(Duration::from_secs(5), demo(&server.client, "lamp", &ctx))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
