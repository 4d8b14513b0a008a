use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use tantum_api::{build_router, AppState};
use tantum_common::{telemetry, Config};
use tantum_events::{ensure_schema, EventQueue, EventStore, WorkerPool};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level, config.log_format);
    config.log_summary();

    // Unreachable storage is the one fatal startup error.
    let store = match EventStore::connect(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Database unavailable, not starting");
            return Err(e.into());
        }
    };
    ensure_schema(store.pool()).await;

    let queue = EventQueue::bounded(config.pool_count)?;
    info!(capacity = queue.capacity(), "Event queue created");
    let workers = WorkerPool::spawn(config.pool_count, queue.clone(), Arc::new(store.clone()));

    let app = build_router(Arc::new(AppState::new(queue.clone())));

    let addr = config.bind_addr();
    info!("Tantum ingest API starting on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, draining event queue");
    queue.close().await;
    workers.join().await;
    store.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Error setting up signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Error setting up SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received shutdown signal"),
        _ = terminate => info!("Received SIGTERM signal"),
    }
}
