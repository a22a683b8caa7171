//! gRPC server startup and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use hookbridge_core::config::app::ServerConfig;
use hookbridge_core::{AppError, AppResult};
use hookbridge_executor::ExecutionEngine;

use crate::proto::webhook_executor_server::WebhookExecutorServer;
use crate::service::BridgeService;

/// How many consecutive ports to probe when the configured one is taken.
const PORT_FALLBACK_ATTEMPTS: u16 = 10;

/// Serve the `WebhookExecutor` service until Ctrl+C or SIGTERM.
///
/// If the configured port is already in use, the next ports are probed in
/// order before giving up.
pub async fn serve(config: &ServerConfig, engine: Arc<ExecutionEngine>) -> AppResult<()> {
    let addr = bind_address(config)?;
    let service = BridgeService::new(engine);

    info!(%addr, "Webhook executor listening");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(
        tonic::transport::Server::builder()
            .add_service(WebhookExecutorServer::new(service))
            .serve_with_shutdown(addr, async {
                let _ = shutdown_rx.await;
            }),
    );

    tokio::select! {
        result = &mut server => return finish(result),
        _ = shutdown_signal() => {
            let _ = shutdown_tx.send(());
        }
    }

    // Bound the in-flight request drain.
    let grace = std::time::Duration::from_secs(config.shutdown_grace_seconds);
    match tokio::time::timeout(grace, server).await {
        Ok(result) => finish(result)?,
        Err(_) => {
            warn!(
                grace_seconds = config.shutdown_grace_seconds,
                "Graceful shutdown timed out, aborting remaining requests"
            );
        }
    }

    info!("Webhook executor shut down gracefully");
    Ok(())
}

fn finish(
    result: Result<Result<(), tonic::transport::Error>, tokio::task::JoinError>,
) -> AppResult<()> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::internal(format!("gRPC server error: {e}"))),
        Err(e) => Err(AppError::internal(format!("gRPC server task failed: {e}"))),
    }
}

/// The ports to probe, clamped at the u16 ceiling.
fn candidate_ports(start: u16) -> impl Iterator<Item = u16> {
    (0..PORT_FALLBACK_ATTEMPTS).map_while(move |offset| start.checked_add(offset))
}

/// Resolve the address to serve on, falling back past occupied ports.
fn bind_address(config: &ServerConfig) -> AppResult<SocketAddr> {
    for port in candidate_ports(config.port) {
        let candidate = format!("{}:{}", config.host, port);
        let addr: SocketAddr = candidate.parse().map_err(|e| {
            AppError::configuration(format!("Invalid server address '{candidate}': {e}"))
        })?;

        // Probe with a throwaway listener; tonic rebinds the port itself.
        match std::net::TcpListener::bind(addr) {
            Ok(_) => {
                if port > config.port {
                    warn!(
                        configured = config.port,
                        selected = port,
                        "Configured port in use, falling back"
                    );
                }
                return Ok(addr);
            }
            Err(e) => {
                warn!(port, error = %e, "Port unavailable");
            }
        }
    }

    Err(AppError::service_unavailable(format!(
        "No free port in range {}..{}",
        config.port,
        config.port.saturating_add(PORT_FALLBACK_ATTEMPTS)
    )))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
