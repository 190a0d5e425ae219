use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("File server failed: {0}")]
    Serve(String),
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Browser driver error: {0}")]
    Driver(String),
    #[error("Title {actual:?} does not contain {expected:?}")]
    TitleMismatch { expected: String, actual: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SmokeError>;
