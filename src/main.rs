use clap::Parser;
use dotenvy::dotenv;
use inverse_smoke::logging::init_logging;
use inverse_smoke::{SmokeConfig, SmokeFixture};
use std::net::IpAddr;
use std::path::PathBuf;

/// Serve a directory over HTTP and check a page title in Chromium.
#[derive(Parser, Debug)]
#[command(name = "inverse-smoke", version)]
struct Cli {
    /// TOML config file (default: smoke.toml, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    host: Option<IpAddr>,
    #[arg(long)]
    port: Option<u16>,
    /// Directory to serve
    #[arg(long)]
    root: Option<PathBuf>,
    /// Page to load, relative to the served root
    #[arg(long)]
    page: Option<String>,
    /// Substring the page title must contain
    #[arg(long)]
    expect: Option<String>,
    /// Show the browser window
    #[arg(long)]
    headed: bool,
    #[arg(long)]
    no_sandbox: bool,
    /// Give up on navigation after this many seconds
    #[arg(long)]
    navigation_timeout: Option<u64>,
    #[arg(long)]
    log_level: Option<String>,
    /// Also write a daily log file here
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> inverse_smoke::Result<SmokeConfig> {
        let mut config = match &self.config {
            Some(path) => SmokeConfig::from_file(path)?,
            None => SmokeConfig::load(),
        };

        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(root) = self.root {
            config.server.root = root;
        }
        if let Some(page) = self.page {
            config.check.page = page;
        }
        if let Some(expect) = self.expect {
            config.check.expected_title = expect;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if self.no_sandbox {
            config.browser.sandbox = false;
        }
        if self.navigation_timeout.is_some() {
            config.browser.navigation_timeout_secs = self.navigation_timeout;
        }
        if self.log_level.is_some() {
            config.logging.level = self.log_level;
        }
        if self.log_dir.is_some() {
            config.logging.dir = self.log_dir;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv();

    let config = Cli::parse().into_config()?;
    let _guard = init_logging(&config.logging)?;
    tracing::debug!(?config, "Resolved configuration");

    let mut fixture = SmokeFixture::setup(config).await?;

    let outcome = fixture.run_check().await;
    let closed = fixture.teardown().await;

    let title = outcome?;
    closed?;
    println!("OK: title {:?}", title);
    Ok(())
}
