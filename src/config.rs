use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SmokeError};
use crate::logging::LoggingConfig;

pub const DEFAULT_PORT: u16 = 8088;
pub const DEFAULT_PAGE: &str = "inverse-dev.html";
pub const DEFAULT_EXPECTED_TITLE: &str = "inVerse";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SmokeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory served as the document root
    pub root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            root: PathBuf::from("."),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub sandbox: bool,
    /// Chromium binary; auto-detected when unset
    pub executable: Option<PathBuf>,
    pub launch_timeout_secs: Option<u64>,
    /// No timeout when unset, a stuck page blocks forever
    pub navigation_timeout_secs: Option<u64>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            executable: None,
            launch_timeout_secs: None,
            navigation_timeout_secs: None,
        }
    }
}

impl BrowserConfig {
    pub fn launch_timeout(&self) -> Option<Duration> {
        self.launch_timeout_secs.map(Duration::from_secs)
    }

    pub fn navigation_timeout(&self) -> Option<Duration> {
        self.navigation_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CheckConfig {
    pub page: String,
    pub expected_title: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE.to_string(),
            expected_title: DEFAULT_EXPECTED_TITLE.to_string(),
        }
    }
}

impl SmokeConfig {
    pub fn load() -> Self {
        let paths = vec![
            PathBuf::from("smoke.toml"),
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("inverse-smoke/smoke.toml"),
        ];

        for path in paths {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Skipping config at {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SmokeError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
            .map_err(|e| SmokeError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SmokeError::Config(e.to_string()))
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.server.root = root.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }
}
