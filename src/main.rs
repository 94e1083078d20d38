mod config;
mod error;
mod handlers;
mod models;
mod server;
mod services;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::Analyzer;
use server::create_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG from it is honored
    dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("🚀 Starting Pantry Lens...");

    let config = Config::from_env().context("Invalid configuration")?;

    let model = services::build_model(&config)?;
    log::info!(
        "✅ {} gateway initialized with model: {} (timeout {:?})",
        config.provider,
        model.model_name(),
        config.timeout
    );

    let analyzer = Arc::new(Analyzer::new(model, config.max_upload_bytes));
    let app = create_router(analyzer);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!("🌐 Server listening on {}", config.bind_addr);
    log::info!("   POST /analyze-pantry/      - recipes from a pantry photo");
    log::info!("   POST /check-freshness/     - days left per perishable item");
    log::info!("   POST /analyze-attraction/  - tourist attraction details");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("🛑 Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
