//! SmartHome CLI - demo client for the SmartHome REST and SSE API
//!
//! Without a subcommand it probes the server status, exercises the REST
//! endpoints and then follows the event stream until Ctrl+C.

mod commands;
mod config;
mod output;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smarthome_client::SmartHomeClient;
use std::future::Future;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{ArgOverrides, Config, MergedConfig};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "smarthome-cli")]
#[command(author, version, about = "SmartHome SSE demo client")]
#[command(propagate_version = true)]
struct Cli {
    /// Server URL [default: http://127.0.0.1:8000]
    #[arg(short, long, env = "SMARTHOME_SERVER")]
    server: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "SMARTHOME_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// HTTP Basic username
    #[arg(short, long, env = "SMARTHOME_USERNAME")]
    username: Option<String>,

    /// HTTP Basic password
    #[arg(short, long, env = "SMARTHOME_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Device toggled by the API exercise [default: lamp]
    #[arg(short, long)]
    device: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server status and recommended mode
    Status,

    /// Exercise the REST endpoints (metrics, devices, toggle)
    Api,

    /// Follow the event stream until Ctrl+C
    Stream,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(ArgOverrides {
        server: cli.server.as_deref(),
        device: cli.device.as_deref(),
        username: cli.username.as_deref(),
        password: cli.password.as_deref(),
        no_color: cli.no_color,
    });
    debug!("Using server {}", merged.server);

    // Create output context
    let ctx = OutputContext::new(cli.output, merged.no_color);
    let client = create_client(&merged)?;

    // Execute command; Ctrl+C at any point ends the run normally
    let command = run(cli.command.as_ref(), &client, &merged.device, &ctx);
    if until_interrupted(command, commands::interrupted())
        .await
        .is_none()
    {
        ctx.info("\n👋 Goodbye!");
    }

    Ok(())
}

async fn run(
    command: Option<&Commands>,
    client: &SmartHomeClient,
    device_id: &str,
    ctx: &OutputContext,
) {
    match command {
        None => {
            commands::demo(client, device_id, ctx).await;
        }

        Some(Commands::Status) => {
            commands::status(client, ctx).await;
        }

        Some(Commands::Api) => {
            let summary = commands::api(client, device_id, ctx).await;
            debug!(
                "API exercise: {} succeeded, {} failed",
                summary.succeeded, summary.failed
            );
        }

        Some(Commands::Stream) => {
            commands::stream(client, ctx).await;
        }
    }
}

/// Drive `work` to completion unless `shutdown` resolves first
///
/// Returns `None` when interrupted; `work` is dropped, which aborts any
/// request still in flight.
async fn until_interrupted<W, S>(work: W, shutdown: S) -> Option<W::Output>
where
    W: Future,
    S: Future<Output = ()>,
{
    tokio::select! {
        output = work => Some(output),
        _ = shutdown => {
            debug!("Interrupted");
            None
        }
    }
}

/// Create a SmartHome client for the resolved configuration
fn create_client(config: &MergedConfig) -> Result<SmartHomeClient> {
    let client =
        SmartHomeClient::new(&config.server).context("Failed to create SmartHome client")?;

    Ok(match &config.credentials {
        Some(credentials) => client.with_credentials(credentials.clone()),
        None => client,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::time::Duration;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_runs_demo() {
        let cli = Cli::try_parse_from(["smarthome-cli"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_subcommand_and_flags() {
        let cli = Cli::try_parse_from([
            "smarthome-cli",
            "--server",
            "http://10.0.0.5:8000",
            "--device",
            "fan",
            "-o",
            "json",
            "api",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Api)));
        assert_eq!(cli.server.as_deref(), Some("http://10.0.0.5:8000"));
        assert_eq!(cli.device.as_deref(), Some("fan"));
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[tokio::test]
    async fn test_finished_work_is_returned() {
        let output = until_interrupted(async { 7 }, std::future::pending()).await;
        assert_eq!(output, Some(7));
    }

    #[tokio::test]
    async fn test_interrupt_ends_a_hanging_demo() {
        // Accepts connections but never answers, so the status probe hangs
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = SmartHomeClient::new(&format!("http://{}", addr)).unwrap();
        let ctx = OutputContext::new(OutputFormat::Json, true);
        let command = run(None, &client, "lamp", &ctx);
        let shutdown = tokio::time::sleep(Duration::from_millis(200));

        let output = tokio::time::timeout(
            Duration::from_secs(5),
            until_interrupted(command, shutdown),
        )
        .await
        .unwrap();

        assert!(output.is_none());
        silent.abort();
    }

    #[test]
    fn test_create_client_rejects_bad_url() {
        let merged = Config::default().merge_with_args(ArgOverrides {
            server: Some("not a url"),
            ..Default::default()
        });
        assert!(create_client(&merged).is_err());
    }
}
