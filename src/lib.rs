//! Reelgraph
//!
//! A social movie-review site over a Neo4j graph:
//! - Users register, log in, review movies with tags and like reviews
//! - Movie pages with cast, keywords, reviews and similar films
//! - Top rated, trending and personal recommendations from graph queries

pub mod api;
pub mod auth;
pub mod neo4j;
pub mod social;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Session secret used when none is configured. Fine for local development only.
pub const DEV_SESSION_SECRET: &str = "reelgraph-development-secret-change-me";

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub security: SecurityYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
    /// Public URL when served behind a proxy (e.g. https://reviews.example)
    pub public_url: Option<String>,
    pub static_path: String,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            public_url: None,
            static_path: "./static".into(),
        }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "neo4j".into(),
        }
    }
}

/// Session and password hashing settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityYamlConfig {
    /// HS256 signing secret for the session cookie
    pub session_secret: Option<String>,
    /// Session lifetime in seconds (default: 86400 = 24h)
    pub session_expiry_secs: u64,
    pub bcrypt_cost: u32,
}

impl Default for SecurityYamlConfig {
    fn default() -> Self {
        Self {
            session_secret: None,
            session_expiry_secs: 86400,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub server_port: u16,
    pub public_url: Option<String>,
    pub static_path: String,
    pub session_secret: String,
    pub session_expiry_secs: u64,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from `config.yaml` in CWD (if any) plus env vars.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let session_secret = std::env::var("SESSION_SECRET")
            .ok()
            .or(yaml.security.session_secret)
            .unwrap_or_else(|| {
                tracing::warn!("No session secret configured, using the development default");
                DEV_SESSION_SECRET.to_string()
            });

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            public_url: std::env::var("PUBLIC_URL").ok().or(yaml.server.public_url),
            static_path: std::env::var("STATIC_PATH").unwrap_or(yaml.server.static_path),
            session_secret,
            session_expiry_secs: yaml.security.session_expiry_secs,
            bcrypt_cost: yaml.security.bcrypt_cost,
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub neo4j: Arc<dyn neo4j::GraphStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j (creating constraints and indexes)
    pub async fn new(config: Config) -> Result<Self> {
        let neo4j = Arc::new(
            neo4j::client::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        Ok(Self {
            neo4j,
            config: Arc::new(config),
        })
    }
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let port = config.server_port;
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    let site = Arc::new(api::handlers::ServerState {
        social: social::Social::new(state.neo4j.clone(), state.config.bcrypt_cost),
        config: state.config.clone(),
    });
    let app = api::create_router(site);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
