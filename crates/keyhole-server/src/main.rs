use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_rustls::TlsAcceptor;
use tracing_subscriber::EnvFilter;

use keyhole_secrets::{PlatformFamily, ProcessEnvironment, SecretResolver};
use keyhole_server::{load_server_config_from_pem, SecretsApi, ServerConfig};

/// Secrets server - exposes environment and configuration values over HTTP
#[derive(Parser, Debug)]
#[command(name = "keyhole-server")]
#[command(about = "Serve environment variables, connection strings and app settings over HTTP")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "keyhole.toml")]
    config: String,

    /// Listen address, overrides config and KEYHOLE_LISTEN_ADDR
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install crypto provider before any TLS operations
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("keyhole_server=info".parse()?)
                .add_directive("keyhole_secrets=info".parse()?),
        )
        .init();

    let args = Args::parse();
    tracing::info!("Starting secrets server with config: {}", args.config);

    let mut config = ServerConfig::load_and_resolve(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    tracing::info!("Environment: {}", config.environment);
    for path in config.settings_files() {
        tracing::info!("Settings file: {}", path.display());
    }

    let configuration = config
        .build_configuration()
        .context("Failed to build application configuration")?;
    tracing::info!("Loaded {} configuration keys", configuration.len());

    let resolver = SecretResolver::new(Arc::new(ProcessEnvironment), Arc::new(configuration));
    tracing::info!("Host platform: {}", PlatformFamily::current());

    let tls_acceptor = match &config.tls {
        Some(tls) => {
            tracing::info!("TLS: using provided certificates");
            let tls_config = load_server_config_from_pem(&tls.cert_pem, &tls.key_pem)
                .context("Failed to load TLS configuration")?;
            Some(TlsAcceptor::from(Arc::new(tls_config)))
        }
        None => {
            tracing::info!("TLS: disabled (plain HTTP)");
            None
        }
    };

    let api = SecretsApi::new(resolver, tls_acceptor);

    tokio::select! {
        result = api.run(config.listen_addr) => {
            tracing::error!("Secrets API stopped: {:?}", result);
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM");
        }
    }
}
