// bin/trust_server.rs - TRAVOS Trust Evaluation Server

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use travos_trust::api::{router, AppState};
use travos_trust::config::AppConfig;
use travos_trust::observability::{init_metrics, init_tracing, TracingFormat};
use travos_trust::store::ScenarioStore;

/// TRAVOS trust evaluation server
#[derive(Parser, Debug)]
#[command(name = "travos-server")]
#[command(author = "SavageS")]
#[command(version)]
#[command(about = "HTTP API for TRAVOS trust evaluation over stored scenarios", long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides config)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Scenario store directory (overrides config)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long)]
    log_format: Option<TracingFormat>,

    /// Enable metrics server
    #[arg(long)]
    metrics: bool,

    /// Metrics listen address (overrides config)
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }
        if let Some(store) = &self.store {
            config.store.path = store.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if self.metrics {
            config.metrics.enabled = true;
        }
        if let Some(addr) = self.metrics_addr {
            config.metrics.listen = addr;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    init_tracing(config.tracing());

    info!("Starting TRAVOS trust server");
    info!(
        confidence_threshold = config.policy.confidence_threshold,
        cooperation_threshold = config.policy.cooperation_threshold,
        error_margin = config.policy.error_margin,
        tie_break = ?config.policy.tie_break,
        parallel = config.evaluation.parallel,
        "Trust policy"
    );

    // Initialize metrics if enabled
    let _metrics_handle = if config.metrics.enabled {
        match init_metrics(config.metrics_config()) {
            Ok(handle) => {
                info!(addr = %config.metrics.listen, "Metrics recorder initialized");
                Some(handle)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to initialize metrics");
                None
            }
        }
    } else {
        None
    };

    if let Some(parent) = config.store.path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!(path = ?parent, "Created data directory");
        }
    }

    let store = ScenarioStore::open(&config.store.path)
        .with_context(|| format!("Failed to open scenario store at {}", config.store.path.display()))?;
    info!(path = ?config.store.path, scenarios = store.list_scenarios()?.len(), "Scenario store opened");

    let state = Arc::new(AppState::new(store.clone(), config.evaluator()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;
    info!(addr = %config.server.listen, "HTTP API listening");
    info!("Press Ctrl+C to shutdown");

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down...");
    store.flush()?;
    Ok(())
}
