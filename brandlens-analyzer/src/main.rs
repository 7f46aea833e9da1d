//! brandlens-analyzer - Brand analysis service entry point
//!
//! Serves `POST /analyze`, which renders a website in a headless browser and
//! extracts its brand colors and fonts with one of four strategies.

use std::path::PathBuf;

use anyhow::{Context, Result};
use brandlens_analyzer::{build_router, AppState, BrandAnalyzer};
use brandlens_common::config::ConfigResolver;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for brandlens-analyzer
#[derive(Parser, Debug)]
#[command(name = "brandlens-analyzer")]
#[command(about = "Website brand color and font analysis service")]
#[command(version)]
struct Args {
    /// Config file (TOML); defaults to the platform config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// WebDriver server URL (chromedriver)
    #[arg(long, env = "WEBDRIVER_URL")]
    webdriver_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config loads before the subscriber exists so its level can seed the filter
    let mut config = ConfigResolver::new(args.config.clone()).load();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.webdriver_url {
        config.browser.webdriver_url = url;
    }

    info!("Starting brandlens-analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!("WebDriver: {}", config.browser.webdriver_url);
    info!("Model: {}", config.model.model);

    let analyzer =
        BrandAnalyzer::from_config(&config).context("Failed to initialize brand analyzer")?;

    let state = AppState::new(analyzer);
    let app = build_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
