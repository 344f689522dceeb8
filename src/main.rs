//! Standalone registry daemon.
//!
//! Loads the TOML config, restores the snapshot, starts the health prober,
//! and serves the HTTP facade until ctrl-c.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use svc_registry::config::loader::load_config;
use svc_registry::{ApiServer, RegistryConfig, ServiceRegistry};

#[derive(Debug, Parser)]
#[command(name = "svc-registry", about = "Service registry with health probing and circuit breaking")]
struct Args {
    /// Path to the TOML config file. Defaults apply when the file is absent.
    #[arg(long, default_value = "registry.toml")]
    config: PathBuf,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svc_registry=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        tracing::info!(path = %args.config.display(), "Config file not found, using defaults");
        RegistryConfig::default()
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        failure_threshold = config.breaker.failure_threshold,
        open_timeout_secs = config.breaker.open_timeout_secs,
        probe_interval_secs = config.health_check.interval_secs,
        snapshot = %config.snapshot.path,
        "Configuration loaded"
    );

    let registry = ServiceRegistry::new(config.clone()).await;
    registry.start().await;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = ApiServer::new(registry.clone(), &config.listener);
    let server_shutdown = registry.subscribe_shutdown();
    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    registry.shutdown().await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
