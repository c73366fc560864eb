//! HTTP server lifecycle.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::router::build_router;
use super::types::ApiContext;

/// Handle to a running server. Dropping it without calling
/// [`ServerHandle::shutdown`] leaves the task serving until the runtime
/// stops.
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Signal graceful shutdown and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }
}

/// Bind the listener and serve in a background task. Binding to port 0
/// picks a free port; the actual address is on the handle.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> std::io::Result<ServerHandle> {
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let router = build_router(ctx);
    let (tx, rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let serve = axum::serve(listener, router).with_graceful_shutdown(async {
            let _ = rx.await;
        });
        if let Err(err) = serve.await {
            tracing::error!(%err, "server error");
        }
    });

    tracing::info!(%addr, "API listening");

    Ok(ServerHandle {
        addr,
        shutdown: Some(tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::db::sqlite::open_memory_database;

    use super::*;

    async fn test_server() -> ServerHandle {
        let ctx = ApiContext::new(open_memory_database().unwrap(), Config::default());
        start_server(ctx, "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn serves_health_and_stops_on_shutdown() {
        let handle = test_server().await;
        let url = format!("http://{}/health", handle.addr);

        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "ok");

        handle.shutdown().await;
        assert!(reqwest::get(&url).await.is_err());
    }

    #[tokio::test]
    async fn protected_routes_reject_anonymous_clients() {
        let handle = test_server().await;
        let url = format!("http://{}/consultas", handle.addr);

        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 401);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"]["code"], "AUTH_MISSING_TOKEN");

        handle.shutdown().await;
    }
}
