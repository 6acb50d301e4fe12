//! Reelgraph - Main Server
//!
//! A movie-review social site over Neo4j.

use anyhow::Result;
use clap::{Parser, Subcommand};
use reelgraph::{AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reelgraph")]
#[command(about = "Graph-backed movie review site")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on (overrides config.yaml / SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory served under /static (overrides config.yaml / STATIC_PATH)
        #[arg(long)]
        static_path: Option<String>,
    },

    /// Create the Neo4j constraints and indexes, then exit
    InitSchema,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reelgraph=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port, static_path } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(path) = static_path {
                config.static_path = path;
            }
            reelgraph::start_server(config).await
        }
        Commands::InitSchema => run_init_schema(config).await,
    }
}

async fn run_init_schema(config: Config) -> Result<()> {
    tracing::info!("Initializing schema on {}", config.neo4j_uri);
    let state = AppState::new(config).await?;
    if state.neo4j.health_check().await? {
        tracing::info!("Schema ready");
    }
    Ok(())
}
