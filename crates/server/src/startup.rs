use std::future::Future;

use axum::Router;
use configs::AppConfig;
use service::{
    auth::service::OtpAuthenticator,
    runtime,
    storage::json_tree_store::JsonTreeStore,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::auth::ServerState;
use crate::errors::StartupError;
use crate::routes;

/// Load the store from disk and set up the authenticator.
pub async fn build_state(cfg: &AppConfig) -> ServerState {
    runtime::ensure_store_dir(&cfg.storage.path).await;
    let store = JsonTreeStore::open(&cfg.storage.path, cfg.storage.strict_persistence).await;
    let auth = OtpAuthenticator::new(cfg.server.secret.clone(), cfg.server.nonce_ttl());
    ServerState { store, auth }
}

pub async fn build_app(cfg: &AppConfig) -> Router {
    let state = build_state(cfg).await;
    if !state.auth.is_enabled() {
        warn!("no server secret configured, /store accepts unauthenticated requests");
    }
    routes::build_router(state)
}

/// Public entry: load the store, listen, and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    run_until(cfg, shutdown_signal()).await
}

/// Serve until `shutdown` resolves; in-flight requests are drained first.
pub async fn run_until<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg).await;

    let host = cfg.server.host.as_str();
    let port = cfg.server.port;
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(|source| StartupError::Bind { addr: format!("{host}:{port}"), source })?;
    let addr = listener.local_addr()?;

    info!(%addr, storage = %cfg.storage.path.display(), "Ready");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}
