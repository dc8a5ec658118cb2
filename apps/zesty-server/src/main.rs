mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use api_gateway::AppState;
use clap::{Parser, Subcommand};
use discomfort::{DiscomfortService, LocalClient};
use mimalloc::MiMalloc;
use taste_graph::HttpTasteGraph;
use text_gen::{GeminiClient, TextGenService};

use crate::config::{AppConfig, CliOverrides};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Zesty server - recommendations that pull you out of your comfort zone
#[derive(Parser)]
#[command(name = "zesty-server")]
#[command(version)]
#[command(about = "Zesty server - recommendations that pull you out of your comfort zone")]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for the HTTP server (overrides config and environment)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (APP__*) -> 4) legacy env -> 5) CLI
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides { port: cli.port });

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    zesty_bootstrap::init_logging(&config.logging, cli.verbose)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    // Clients and the middleware stack validate URLs and CORS settings on
    // construction.
    let state = build_state(config)?;
    api_gateway::build_app(state, &config.server)?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

fn build_state(config: &AppConfig) -> Result<AppState> {
    let graph = Arc::new(
        HttpTasteGraph::new(&config.taste_graph).context("failed to build taste graph client")?,
    );
    let text_gen = TextGenService::new(Arc::new(
        GeminiClient::new(&config.text_gen).context("failed to build text generation client")?,
    ));
    let pipeline = DiscomfortService::new(graph.clone(), text_gen.clone(), config.discomfort.clone());

    Ok(AppState {
        graph,
        text_gen,
        discomfort: Arc::new(LocalClient::new(Arc::new(pipeline))),
    })
}

async fn run_server(config: &AppConfig) -> Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Zesty server starting");

    let state = build_state(config)?;
    let app = api_gateway::build_app(state, &config.server)?;

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    api_gateway::serve(listener, app, zesty_bootstrap::shutdown_signal()).await
}
