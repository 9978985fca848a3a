//! HTTP server implementation for the upload benchmark

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{handlers, timing};
use crate::app_state::AppState;
use upload_bench_core::{Endpoint, Result};

/// Creates the main application router with all routes and middleware
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let uploads = Router::new()
        .route(&Endpoint::SyncFile.path(), post(handlers::upload_sync_file))
        .route(&Endpoint::AsyncFile.path(), post(handlers::upload_async_file))
        .route(&Endpoint::SyncUploadfile.path(), post(handlers::upload_sync_uploadfile))
        .route(&Endpoint::AsyncUploadfile.path(), post(handlers::upload_async_uploadfile))
        .route(&Endpoint::AsyncStream.path(), post(handlers::upload_async_stream))
        .layer(DefaultBodyLimit::max(app_state.config.max_body_bytes));

    Router::new()
        // System routes
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_check))

        // Upload routes
        .merge(uploads)

        // Apply middleware to ALL routes; tracing wraps timing
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(app_state.clone(), timing::timing_middleware))
        )
        .with_state(app_state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app_state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(app_state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM
pub async fn start_api_server(app_state: Arc<AppState>) -> Result<()> {
    let http_addr = app_state.config.http_addr;
    let listener = TcpListener::bind(http_addr).await?;

    info!("Server listening on http://{}", listener.local_addr()?);
    for endpoint in Endpoint::all() {
        info!("  POST {}", endpoint.path());
    }

    serve(listener, app_state, shutdown_signal()).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
