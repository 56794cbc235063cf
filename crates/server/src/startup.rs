use std::future::Future;

use axum::Router;
use configs::AppConfig;
use service::store::{self, backend::Backend};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the configured store and build the router around it.
pub async fn build_app(cfg: &AppConfig) -> Result<(Backend, Router), StartupError> {
    let backend = Backend::open(&cfg.storage).await?;
    let shared = backend.store();
    let (shops, products) = store::stats(shared.as_ref()).await?;
    info!(
        service = "server",
        event = "store_ready",
        backend = shared.backend(),
        shops,
        products,
        "store initialized"
    );
    let app = routes::build_router(AppState::new(shared), build_cors());
    Ok((backend, app))
}

/// Serve on `listener` until `shutdown` resolves, then drain and close the store.
pub async fn serve<F>(listener: TcpListener, cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (backend, app) = build_app(&cfg).await?;
    let addr = listener.local_addr()?;
    info!(service = "server", event = "listening", %addr, "storefront server listening");

    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown).await;
    let closed = backend.shutdown().await;
    served?;
    closed?;
    info!(service = "server", event = "drained", "server stopped accepting requests");
    Ok(())
}

/// Bind `server.host:server.port` and serve until Ctrl+C or SIGTERM.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .map_err(|e| StartupError::InvalidConfig(format!("cannot bind {}:{}: {e}", cfg.server.host, cfg.server.port)))?;
    serve(listener, cfg, shutdown_signal()).await
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
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
                warn!(error = %e, "cannot listen for SIGTERM");
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
    info!(service = "server", event = "shutdown_signal", "shutdown signal received");
}
