//! HTTP server setup and routing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::any};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use peerverify_logging::DecisionLog;
use peerverify_status::StatusSource;

use crate::verify;

/// State shared by every request. Holds no per-request data.
#[derive(Clone)]
pub struct GatewayState {
    pub source: Arc<dyn StatusSource>,
    pub audit: Arc<dyn DecisionLog>,
}

impl GatewayState {
    pub fn new(source: Arc<dyn StatusSource>, audit: Arc<dyn DecisionLog>) -> Self {
        Self { source, audit }
    }
}

/// `/verify` takes every method so that non-POST requests get the same 404
/// as any unknown path instead of a 405 that confirms the route exists.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/verify", any(verify::verify))
        .fallback(verify::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: GatewayState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

/// Bind `addr` and serve the webhook until `shutdown` resolves.
#[instrument(skip(state, shutdown))]
pub async fn start_server<F>(addr: SocketAddr, state: GatewayState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("peerverify listening on {}", addr);
    serve(listener, state, shutdown).await?;
    info!("peerverify stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use peerverify_logging::TracingDecisionLog;
    use peerverify_status::CommandStatusSource;
    use serde_json::{Value, json};
    use tokio::sync::oneshot;

    // Exercises the whole pipeline over real TCP with a real subprocess.
    #[tokio::test]
    async fn serves_verify_end_to_end() {
        let source = CommandStatusSource::new(
            "sh",
            [
                "-c",
                r#"printf '{"Self":{"PublicKey":"K1"},"Peer":{"x":{"PublicKey":"K2"}}}'"#,
            ],
        );
        let state = GatewayState::new(Arc::new(source), Arc::new(TracingDecisionLog));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, state, async move {
            let _ = stop_rx.await;
        }));

        let client = reqwest::Client::new();
        let url = format!("http://{addr}/verify");

        let resp = client
            .post(&url)
            .json(&json!({"NodePublic": "K2", "Source": "1.2.3.4"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.json::<Value>().await.unwrap(), json!({"Allow": true}));

        let resp = client
            .post(&url)
            .json(&json!({"NodePublic": "K9", "Source": "1.2.3.4"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.json::<Value>().await.unwrap(), json!({"Allow": false}));

        let resp = client
            .post(&url)
            .json(&json!({"Source": "1.2.3.4"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        drop(client);
        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn start_server_reports_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let state = GatewayState::new(
            Arc::new(CommandStatusSource::default()),
            Arc::new(TracingDecisionLog),
        );
        let err = start_server(addr, state, async {}).await.unwrap_err();
        assert!(err.to_string().contains("failed to bind"));
    }
}
