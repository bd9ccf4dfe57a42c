//! Keep-alive endpoint for external liveness probes.
//!
//! Returns a static body if the bot process is running. No business logic
//! lives here.

use axum::{routing::get, Router};
use tracing::{error, info};

async fn root_handler() -> &'static str {
    "Discord Bot is running!"
}

/// Serve the keep-alive endpoint on `0.0.0.0:{port}`.
///
/// Bind or serve errors are logged and leave the bot itself running.
pub async fn serve(port: u16) {
    let app = Router::new().route("/", get(root_handler));
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!(%addr, "Keep-alive endpoint listening");
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "Keep-alive server error");
            }
        }
        Err(e) => error!(error = %e, %addr, "Failed to bind keep-alive endpoint"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_reports_running() {
        assert_eq!(root_handler().await, "Discord Bot is running!");
    }
}
