//! OpenDev Server
//!
//! Axum server exposing the multi-agent workflow engine from crates/core
//! over HTTP and WebSocket, plus a one-shot CLI runner.

mod api;
mod mock;

use anyhow::Context;
use clap::{Parser, Subcommand};
use opendev_core::models::ModelConfig;
use opendev_core::state::{ChatSummary, WorkflowDump};
use opendev_core::swarm::{Coordinator, CoordinatorConfig, RunRequest};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

use api::{AppState, Backend, SharedState};

const DEFAULT_PORT: u16 = 8001;

#[derive(Parser, Clone)]
#[command(author, version, about = "OpenDev - Multi-agent workflow engine")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the agents server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Interface to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Answer with canned replies instead of calling a provider
        #[arg(long)]
        mock: bool,
    },
    /// Run the workflow on one message (CLI mode, no server)
    Run {
        /// The user request
        message: String,
        /// Answer with canned replies instead of calling a provider
        #[arg(long)]
        mock: bool,
        /// Print the full workflow dump instead of the last message
        #[arg(long)]
        full: bool,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn backend(mock: bool) -> anyhow::Result<Backend> {
    if mock {
        tracing::info!("Using canned agent replies");
        return Ok(Backend::Mock);
    }

    let model = ModelConfig::from_env();
    tracing::info!(
        provider = model.provider.display_name(),
        model = %model.model,
        base_url = model.effective_base_url(),
        "Using text-generation provider"
    );
    let llm = model
        .create_llm()
        .context("No usable provider configured (pass --mock to run offline)")?;
    Ok(Backend::Live(llm))
}

async fn run_server(host: &str, port: u16, mock: bool) -> anyhow::Result<()> {
    let config = CoordinatorConfig::from_env();
    tracing::info!(
        max_hops = config.max_hops,
        timeout_secs = ?config.run_timeout_secs,
        "Coordinator configured"
    );

    let state: SharedState = Arc::new(AppState::new(backend(mock)?, config));
    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    println!("🚀 OpenDev agents running at http://{}", addr);
    println!("   Health:    /health");
    println!("   Chat:      /api/chat (POST)");
    println!("   Workflow:  /api/workflow/run (POST), /api/workflow/schema");
    println!("   OpenAPI:   /api/openapi.json");
    println!("   Stream:    /ws/workflow (WebSocket)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_cli(message: String, mock: bool, full: bool) -> anyhow::Result<()> {
    let config = CoordinatorConfig::from_env();
    let coordinator = Coordinator::new(config, backend(mock)?.llm());

    let state = coordinator
        .run_with_timeout(RunRequest::new(message))
        .await
        .context("Workflow run failed")?;

    let output = if full {
        serde_json::to_string_pretty(&WorkflowDump::from_state(&state))?
    } else {
        serde_json::to_string_pretty(&ChatSummary::from_state(&state))?
    };
    println!("{}", output);

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    match args.command {
        Some(CliCommand::Run {
            message,
            mock,
            full,
        }) => run_cli(message, mock, full).await,
        Some(CliCommand::Serve { port, host, mock }) => run_server(&host, port, mock).await,
        None => run_server("127.0.0.1", DEFAULT_PORT, false).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve_flags() {
        let args = Args::parse_from(["opendev", "serve", "--port", "9000", "--mock"]);
        match args.command {
            Some(CliCommand::Serve { port, mock, host }) => {
                assert_eq!(port, 9000);
                assert!(mock);
                assert_eq!(host, "127.0.0.1");
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_cli_parses_run() {
        let args = Args::parse_from(["opendev", "run", "Add likes", "--full"]);
        match args.command {
            Some(CliCommand::Run {
                message,
                mock,
                full,
            }) => {
                assert_eq!(message, "Add likes");
                assert!(!mock);
                assert!(full);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_serve_default_port() {
        let args = Args::parse_from(["opendev", "serve"]);
        assert!(matches!(
            args.command,
            Some(CliCommand::Serve { port: 8001, mock: false, .. })
        ));
    }
}
