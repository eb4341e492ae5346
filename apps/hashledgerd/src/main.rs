use anyhow::Context as _;
use clap::Parser;
use hashledger_store::open_receipt_ledger;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod app;
mod hashes;
mod middleware;
mod settings;

use crate::app::AppState;
use crate::settings::{Args, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .json()
        .init();

    let settings = Settings::from_args(Args::parse()).context("load settings")?;
    if settings.uses_demo_api_key() {
        warn!("using the built-in demo API key; set I_TYPED_THIS_API_KEY for real deployments");
    }

    let ledger = open_receipt_ledger(settings.ledger.clone())
        .await
        .context("open receipt ledger")?;
    info!(backend = ledger.kind().as_str(), "receipt ledger ready");

    let app = app::router(AppState::new(ledger, &settings));
    let listener = TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("bind {}", settings.bind))?;
    info!(addr = %settings.bind, "hashledgerd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("hashledgerd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
