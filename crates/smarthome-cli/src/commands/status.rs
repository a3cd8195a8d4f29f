//! Status command - probe the server capability summary

use smarthome_client::{ServerStatus, SmartHomeClient};
use tracing::debug;

use crate::output::OutputContext;

/// Fetch and print the server status
///
/// Returns `None` when the server cannot be reached or answers with anything
/// other than a valid status document; the reason has been printed already.
pub async fn status(client: &SmartHomeClient, ctx: &OutputContext) -> Option<ServerStatus> {
    debug!("Probing {}", client.base_url());

    let status = match client.status().await {
        Ok(status) => status,
        Err(e) => {
            ctx.error(&format!("❌ Server not available: {}", e));
            return None;
        }
    };

    ctx.heading("📡 SERVER STATUS");
    ctx.info(&format!("MQTT Available: {}", status.mqtt_available));
    ctx.info(&format!("MQTT Broker: {}", status.broker_address()));
    ctx.info(&format!(
        "Recommended Mode: {}",
        status.recommended_mode.to_uppercase()
    ));
    ctx.info(&format!("SSE Clients: {}", status.sse_clients_count));
    ctx.info("");

    if status.mqtt_available {
        ctx.success("✅ MQTT mode: full control (read/write)");
    } else {
        ctx.info("⚠️  SSE mode: read-only (guest mode)");
    }

    ctx.print_json(&status);

    Some(status)
}
