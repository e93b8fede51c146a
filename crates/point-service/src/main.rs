//! 积分账本服务入口
//!
//! 提供积分查询、流水查询、充值、使用的 REST API。

use std::sync::Arc;

use point_service::{
    AppState, LockConfig, LockRegistry, PointHistoryRepository, PointService,
    UserPointRepository, routes,
};
use point_shared::{config::AppConfig, observability};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

const SERVICE_NAME: &str = "point-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;
    let _guard = observability::init(&config.service_name, &config.observability).await?;

    info!(
        environment = %config.environment,
        addr = %config.server_addr(),
        lock_timeout_ms = ?config.ledger.lock_timeout_ms,
        simulated_latency_ms = config.store.simulated_latency_ms,
        "Starting point-service"
    );

    let user_points = Arc::new(UserPointRepository::new(&config.store));
    let histories = Arc::new(PointHistoryRepository::new(&config.store));
    let locks = Arc::new(LockRegistry::new(LockConfig {
        acquire_timeout: config.ledger.lock_timeout(),
    }));

    let sweeper = config.ledger.lock_sweep_interval().map(|interval| {
        info!(interval_secs = interval.as_secs(), "Idle lock sweeper enabled");
        locks.clone().spawn_sweeper(interval)
    });

    let service = Arc::new(PointService::new(user_points, histories, locks));
    let app = routes::build_router(AppState::new(service));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("point-service listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("point-service stopped");
    Ok(())
}

/// 等待 Ctrl-C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received");
}
