//! HTTP surface of the gateway: `GET /health` and `POST /lensTag`.

pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::{build_app_state, AppState};

use tokio::net::TcpListener;
use tracing::info;

/// Serve the router on `listener` until Ctrl-C.
pub async fn run(listener: TcpListener, app_state: AppState) -> anyhow::Result<()> {
    let app = create_router(app_state);

    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
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
                tracing::error!("Failed to listen for SIGTERM: {e}");
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

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_on_sigterm() {
        let waiter = tokio::spawn(shutdown_signal());
        // Give the handler time to register before raising the signal.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .expect("kill should run");
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("shutdown_signal should resolve on SIGTERM")
            .expect("task should not panic");
    }
}
