use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use unbound_overrides::{AppState, api, config::AppConfig, unbound::Unbound};

#[derive(Parser, Debug)]
#[command(author, version, about = "external-dns webhook provider for OPNsense Unbound", rename_all = "kebab-case")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, value_name = "PATH", env = "CONFIG_PATH", default_value = "config.yml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    init_tracing(&config.log_directive());

    let provider = Unbound::from_config(&config).context("failed to build OPNsense client")?;
    let state = Arc::new(AppState::new(provider));
    let app = api::create_router(state);

    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to install CTRL+C handler: {err}");
    }
    info!("shutdown signal received");
}

fn init_tracing(default_directive: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{default_directive},tower_http=info").into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
