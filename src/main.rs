use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use axum::http::{
    HeaderName, HeaderValue, Method,
    header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use anyhow::{Context, anyhow};

use voicecall_gateway::{Params, ServerConfig, SignedRequest, routes, state::AppState};

/// Voice call gateway - signed provider API client and call workflow server
#[derive(Parser, Debug)]
#[command(name = "voicecall-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the Authorization header for a request without sending it
    Sign {
        /// HTTP method
        #[arg(short = 'm', long = "method", default_value = "GET")]
        method: String,

        /// API path, e.g. /v1/info/balance/
        path: String,

        /// Request parameters as key=value
        params: Vec<String>,
    },
}

fn parse_params(pairs: &[String]) -> anyhow::Result<Params> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("Invalid parameter '{pair}', expected key=value"))
        })
        .collect()
}

fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-request-id")]);

    match origins {
        Some("*") => base.allow_origin(Any),
        Some(list) => {
            let origins: Vec<HeaderValue> = list
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            base.allow_origin(origins)
        }
        None => {
            info!(
                "CORS not configured, defaulting to same-origin only. \
                 Set CORS_ALLOWED_ORIGINS to enable cross-origin access."
            );
            base
        }
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(config_path) => {
            info!("Loading configuration from {}", config_path.display());
            ServerConfig::from_file(&config_path)
                .with_context(|| format!("Failed to load {}", config_path.display()))
        }
        None => ServerConfig::from_env().context("Failed to load configuration from environment"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    // Handle subcommands
    if let Some(command) = cli.command {
        match command {
            Commands::Sign {
                method,
                path,
                params,
            } => {
                let params = parse_params(&params)?;
                let signed = SignedRequest::new(&method, &path, &params, &config.credentials);
                println!("{} {}", signed.method(), signed.path());
                if !signed.encoded_params().is_empty() {
                    println!("params: {}", signed.encoded_params());
                }
                println!("Authorization: {}", signed.authorization());
                return Ok(());
            }
        }
    }

    let address = config.address();
    let cors = cors_layer(config.cors_allowed_origins.as_deref());
    info!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config).map_err(|e| anyhow!("Failed to build provider client: {e}"))?;

    // Security headers
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    let app = routes::api::create_api_router()
        .with_state(app_state)
        .layer(cors)
        .layer(security_headers);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    info!("Server listening on http://{}", socket_addr);

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
