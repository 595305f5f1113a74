//! Donation API binary.

use donation_api::{create_router, AppState, Config};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Donation API");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "FATAL: Config error, fix env vars or donation-api.toml");
            std::process::exit(1);
        }
    };

    if config.api_key().is_some() {
        info!("API key auth enabled");
    } else {
        warn!("DONATION_API_KEY not set, /admin routes are unprotected (dev mode)");
    }

    info!(
        data_path = %config.data_path,
        encrypted = config.store_key().is_some(),
        flush_interval_secs = config.flush_interval_secs,
        "Configuration loaded"
    );

    let bind_address = config.bind_address.clone();
    let flush_interval = Duration::from_secs(config.flush_interval_secs.max(1));
    let state = Arc::new(AppState::new(config)?);

    let cancel = CancellationToken::new();

    let store = Arc::clone(&state.store);
    let cancel_bg = cancel.clone();
    let flusher = tokio::spawn(async move {
        store.run_flusher(flush_interval, cancel_bg).await;
    });

    let app = create_router(state.clone());

    info!(address = %bind_address, "Listening");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    // --- Graceful shutdown: stop the flusher, then persist what is left ---
    info!("HTTP server stopped, flushing store...");
    cancel.cancel();
    if let Err(e) = flusher.await {
        error!(error = %e, "Store flusher task failed");
    }

    match state.store.flush().await {
        Ok(true) => info!("Store persisted to disk"),
        Ok(false) => info!("Store already up to date"),
        Err(e) => error!(error = %e, "Failed to persist store on shutdown"),
    }

    info!("Donation API shut down gracefully");
    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }

    state.begin_shutdown();
}
