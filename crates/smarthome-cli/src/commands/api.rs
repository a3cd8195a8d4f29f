//! Api command - exercise the REST endpoints one after another

use smarthome_client::{SmartHomeClient, SmartHomeError};

use crate::output::OutputContext;
use crate::render::{format_device, format_metrics, on_off};

/// How many of the exercised calls succeeded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExerciseSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl ExerciseSummary {
    fn record<T>(&mut self, result: &Result<T, SmartHomeError>) {
        if result.is_ok() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Fetch metrics, list devices, then toggle `device_id`
///
/// Each call is independent: a failure is reported and the next call still
/// runs.
pub async fn api(
    client: &SmartHomeClient,
    device_id: &str,
    ctx: &OutputContext,
) -> ExerciseSummary {
    let mut summary = ExerciseSummary::default();

    ctx.heading("🔌 HTTP API ENDPOINTS");

    ctx.info("\n1️⃣  GET /api/metrics");
    let metrics = client.metrics().await;
    summary.record(&metrics);
    match metrics {
        Ok(metrics) => {
            ctx.success(&format!("   ✅ {}", format_metrics(&metrics)));
            ctx.print_json(&metrics);
        }
        Err(e) => report_failure(ctx, &e),
    }

    ctx.info("\n2️⃣  GET /api/devices");
    let devices = client.list_devices().await;
    summary.record(&devices);
    match devices {
        Ok(devices) => {
            ctx.success(&format!("   ✅ Found {} devices:", devices.len()));
            for device in &devices {
                ctx.info(&format!("      {}", format_device(device)));
            }
            ctx.print_json(&devices);
        }
        Err(e) => report_failure(ctx, &e),
    }

    ctx.info(&format!("\n3️⃣  POST /api/devices/{}/toggle", device_id));
    let toggled = client.toggle_device(device_id).await;
    summary.record(&toggled);
    match toggled {
        Ok(device) => {
            ctx.success(&format!(
                "   ✅ {} toggled to {}",
                device.name,
                on_off(device.is_on)
            ));
            ctx.print_json(&device);
        }
        Err(e) => report_failure(ctx, &e),
    }

    summary
}

/// Non-2xx answers show the status code, anything else the error itself
fn report_failure(ctx: &OutputContext, error: &SmartHomeError) {
    match error.status() {
        Some(status) => ctx.error(&format!("   ❌ Failed: {} ({})", status, error)),
        None => ctx.error(&format!("   ❌ Error: {}", error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use smarthome_client::testing::{MockHome, TestServer};

    fn quiet() -> OutputContext {
        OutputContext::new(OutputFormat::Json, true)
    }

    #[tokio::test]
    async fn test_all_calls_succeed() {
        let home = MockHome::new();
        let server = TestServer::start(home.router()).await.unwrap();

        let summary = api(&server.client, "lamp", &quiet()).await;
        assert_eq!(
            summary,
            ExerciseSummary {
                succeeded: 3,
                failed: 0
            }
        );
        assert!(home.devices().iter().any(|d| d.id == "lamp" && d.is_on));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_calls() {
        let home = MockHome::new().with_metrics(None);
        let server = TestServer::start(home.router()).await.unwrap();

        let summary = api(&server.client, "lamp", &quiet()).await;
        assert_eq!(
            summary,
            ExerciseSummary {
                succeeded: 2,
                failed: 1
            }
        );
        // The toggle still ran after metrics failed
        assert!(home.devices().iter().any(|d| d.id == "lamp" && d.is_on));
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let server = TestServer::start(MockHome::new().router()).await.unwrap();

        let summary = api(&server.client, "toaster", &quiet()).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 2);
    }

    #[tokio::test]
    async fn test_running_twice_toggles_twice() {
        let home = MockHome::new();
        let server = TestServer::start(home.router()).await.unwrap();

        api(&server.client, "fan", &quiet()).await;
        assert!(home.devices().iter().any(|d| d.id == "fan" && !d.is_on));

        api(&server.client, "fan", &quiet()).await;
        assert!(home.devices().iter().any(|d| d.id == "fan" && d.is_on));
    }
}
