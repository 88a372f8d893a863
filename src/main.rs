//! Income statements server
//!
//! Serves filtered AAPL annual income statements at `/api/income-statements`.
//!
//! Usage:
//!   statements-server --bind 127.0.0.1:8080
//!
//! Environment:
//!   FMP_API_KEY - Financial Modeling Prep key (requests fail with 500 without it)
//!   FMP_BASE_URL - Upstream base URL (default: https://financialmodelingprep.com)
//!   BIND_ADDR - Listen address (default: 0.0.0.0:8080)
//!   CORS_ALLOWED_ORIGINS - Comma-separated origins (default: any)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use statements_backend::{
    api::create_router,
    config::{
        dotenv_candidates, CorsPolicy, FmpConfig, DEFAULT_FMP_BASE_URL, DEFAULT_LOG_FILTER,
    },
    scrapers::FmpClient,
};

#[derive(Parser, Debug)]
#[command(name = "statements-server")]
#[command(about = "Filtered income statements over HTTP")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Financial Modeling Prep API key
    #[arg(long, env = "FMP_API_KEY", hide_env_values = true)]
    fmp_api_key: Option<String>,

    /// Financial Modeling Prep base URL
    #[arg(long, env = "FMP_BASE_URL", default_value = DEFAULT_FMP_BASE_URL)]
    fmp_base_url: String,

    /// Allowed CORS origins (comma-separated, empty for any)
    #[arg(long, env = "CORS_ALLOWED_ORIGINS")]
    cors_allowed_origins: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks
    load_env();
    init_tracing();

    let args = Args::parse();

    let fmp_config = FmpConfig::new(args.fmp_api_key).with_base_url(args.fmp_base_url);
    let cors = CorsPolicy::from_list(args.cors_allowed_origins.as_deref());

    info!(
        api_key_configured = fmp_config.has_api_key(),
        upstream = %fmp_config.base_url,
        cors = ?cors,
        "Starting income statements server"
    );
    if !fmp_config.has_api_key() {
        warn!("FMP_API_KEY is not set; /api/income-statements will answer 500");
    }

    let source = Arc::new(FmpClient::new(fmp_config)?);
    let app = create_router(source, cors);

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("API server listening on {}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Shutting down server...");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn load_env() {
    // dotenv never overrides a variable that is already set
    dotenv().ok();
    dotenv_candidates(Path::new(env!("CARGO_MANIFEST_DIR")))
        .iter()
        .filter(|path| path.is_file())
        .for_each(|path| {
            dotenv::from_path(path).ok();
        });
}
