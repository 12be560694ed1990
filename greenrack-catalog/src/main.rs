//! greenrack-catalog — dispensary catalog manager service
//!
//! Serves the image repository, rule matching, bulk-apply pipelines, and
//! cached POS passthrough endpoints for the dashboard UI.

use anyhow::Result;
use clap::Parser;
use greenrack_catalog::services::PosClient;
use greenrack_catalog::{build_router, db, AppState};
use greenrack_common::TtlCache;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "greenrack-catalog", about = "GreenRack catalog manager service")]
struct Args {
    /// Port to listen on (overrides env/config file)
    #[arg(long)]
    port: Option<u16>,

    /// Path to the catalog database (overrides env/config file)
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting GreenRack Catalog v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = greenrack_common::config::resolve(args.port, args.database)?;
    info!("Database path: {}", config.database_path.display());

    let pool = db::connect(&config.database_path).await?;
    db::init_schema(&pool).await?;

    let pos = PosClient::new(&config.pos.base_url, &config.pos.auth_token)
        .map_err(|e| anyhow::anyhow!("Failed to create POS client: {}", e))?;
    info!("POS client configured for {}", config.pos.base_url);

    let state = AppState::new(pool, Arc::new(pos), TtlCache::new());
    let app = build_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(
        "greenrack-catalog listening on http://{}:{}",
        config.host, config.port
    );
    info!("Health check: http://{}:{}/health", config.host, config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
