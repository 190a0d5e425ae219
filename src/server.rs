use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::{TcpListener, TcpSocket};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{Result, SmokeError};

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html>
<html>
<head><title>Error response</title></head>
<body>
<h1>Error response</h1>
<p>Error code: 404</p>
<p>Message: File not found.</p>
</body>
</html>
";

async fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE))
}

/// Static files under `root`, directories answered with their `index.html`.
pub fn router(root: &Path) -> Router {
    let files = ServeDir::new(root).not_found_service(not_found.into_service());
    Router::new()
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
}

fn bind_reusable(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(1024)
}

/// A file server running on a background task.
///
/// Dropping the handle signals the task to stop without waiting for it;
/// call [`StaticServer::shutdown`] to wait until the socket is released.
pub struct StaticServer {
    local_addr: SocketAddr,
    root: PathBuf,
    shutdown: CancellationToken,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl StaticServer {
    pub async fn start(config: &ServerConfig) -> Result<Self> {
        let root = config.root.canonicalize().map_err(|e| {
            SmokeError::Config(format!("serve root {}: {}", config.root.display(), e))
        })?;
        if !root.is_dir() {
            return Err(SmokeError::Config(format!(
                "serve root {} is not a directory",
                root.display()
            )));
        }

        let addr = config.addr();
        let listener = bind_reusable(addr).map_err(|source| SmokeError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        let app = router(&root);
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(signal.cancelled_owned())
                .await
        });

        println!("serving at port {}", local_addr.port());
        tracing::info!(addr = %local_addr, root = %root.display(), "Static file server started");

        Ok(Self {
            local_addr,
            root,
            shutdown,
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.shutdown.cancel();
        let Some(task) = self.task.take() else {
            return Ok(());
        };

        match task.await {
            Ok(Ok(())) => {
                tracing::info!(addr = %self.local_addr, "Static file server stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(SmokeError::Serve(e.to_string())),
            Err(e) => Err(SmokeError::Serve(format!("server task failed: {}", e))),
        }
    }
}

impl Drop for StaticServer {
    fn drop(&mut self) {
        if self.task.is_some() {
            tracing::debug!(addr = %self.local_addr, "Static file server abandoned, signalling stop");
        }
        self.shutdown.cancel();
    }
}
