//! Liveness HTTP endpoint.
//!
//! A trivial keep-alive shim so the hosting platform sees the process
//! as a web service. Not part of the order-round core.

use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;

async fn keep_alive() -> &'static str {
    "Keep me running!"
}

/// Build the liveness routes.
pub fn liveness_routes() -> Router {
    Router::new().route("/", get(keep_alive))
}

/// Spawn the liveness server on the given port.
pub fn spawn(port: u16) -> JoinHandle<()> {
    tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .expect("Failed to bind liveness port");
        tracing::info!(port, "Liveness server started");
        axum::serve(listener, liveness_routes()).await.ok();
    })
}
