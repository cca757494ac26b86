//! hitcount server
//!
//! - `GET /`       : greeting
//! - `GET /redis`  : increment the shared hit counter (bounded retry on store
//!   connectivity failures)
//! - `GET /healthz`, `/readyz`, `/metrics` : operations
//!
//! Config: `hitcount.yaml` (or `HITCOUNT_CONFIG`), overridden by `REDIS_URL`
//! and `PORT`. Startup fails when no store URL is configured.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hitcount_core::error::{HitCountError, Result};
use hitcount_server::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(code = e.client_code().as_str(), error = %e, "hitcount-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_from_env()?;
    let listen = cfg.server.listen_addr()?;

    let state = AppState::from_config(&cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(
        %listen,
        store = cfg.store.kind.as_str(),
        url = %cfg.store.url.as_deref().map(config::redact_url).unwrap_or_default(),
        max_retries = cfg.retry.max_retries,
        delay_ms = cfg.retry.delay_ms,
        "hitcount-server starting"
    );
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| HitCountError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| HitCountError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    state.set_draining();
    tracing::info!("signal received, starting graceful shutdown");
}
