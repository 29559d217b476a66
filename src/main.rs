//! Expert Dashboard - statistics service for expert talent batches
//!
//! Accepts a plain-text list of talent ids, resolves each id to an expert
//! record, and serves aggregated dashboard statistics over HTTP.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup error (bad arguments, config, bind failure, etc.)

mod analysis;
mod api;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod service;
mod session;
mod source;
mod validation;

use analysis::AggregationPolicy;
use anyhow::{Context, Result};
use api::AppState;
use chrono::Utc;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use service::DashboardService;
use session::{SessionStore, StoreOptions};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // No logging needed for --init-config
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Expert Dashboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_server(args).await {
        error!("Server failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: write a default config file.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize category sets, session TTL, and the record source.");
    Ok(())
}

fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build the service from config and serve until ctrl-c.
async fn run_server(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let source = source::build_source(&config.source)?;
    let ttl = config.session.ttl()?;

    let store = SessionStore::new(
        AggregationPolicy::from(&config.aggregation),
        StoreOptions {
            ttl,
            allow_empty_upload: config.session.allow_empty_upload,
        },
    );

    if ttl.is_some() {
        spawn_session_sweeper(
            store.clone(),
            Duration::from_secs(config.session.sweep_interval_seconds),
        );
    }

    let service = DashboardService::new(store, source.clone());
    let app = api::build_router(AppState::new(service), config.server.max_upload_bytes);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    println!("🚀 Expert Dashboard listening on http://{}", addr);
    println!("   Source: {}", source.name());
    match config.session.ttl_seconds {
        Some(secs) => println!("   Session TTL: {}s", secs),
        None => println!("   Session TTL: none (sessions kept until restart)"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

/// Periodically drop sessions that outlived the TTL.
fn spawn_session_sweeper(store: SessionStore, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = store.purge_expired(Utc::now());
            if removed > 0 {
                info!("Purged {} expired sessions ({} remaining)", removed, store.len());
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
