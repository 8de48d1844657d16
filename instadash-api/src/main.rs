//! instadash-api - Instagram monitoring dashboard backend
//!
//! Serves the dashboard's JSON routes over the configured store
//! (hosted Supabase, or a local SQLite file when no Supabase credentials are
//! configured).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use instadash_api::{build_router, AppState};
use instadash_common::{store, Config};

/// Dashboard API server
#[derive(Debug, Parser)]
#[command(name = "instadash-api", version, about)]
struct Args {
    /// TOML config file (defaults to the platform config directory)
    #[arg(long, env = "INSTADASH_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides config and INSTADASH_BIND
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting instadash-api v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let store = match store::connect(&config.store).await {
        Ok(store) => {
            info!("✓ Store ready ({})", store.backend_name());
            store
        }
        Err(e) => {
            error!("Failed to open store: {}", e);
            return Err(e.into());
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(store, config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("instadash-api listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
