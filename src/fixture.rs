use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use url::Url;

use crate::browser::{ChromeDriver, PageDriver};
use crate::config::SmokeConfig;
use crate::error::{Result, SmokeError};
use crate::server::StaticServer;

/// Checks that `title` contains `expected`.
pub fn check_title(title: &str, expected: &str) -> Result<()> {
    if title.contains(expected) {
        Ok(())
    } else {
        Err(SmokeError::TitleMismatch {
            expected: expected.to_string(),
            actual: title.to_string(),
        })
    }
}

/// A running file server plus the browser pointed at it.
pub struct SmokeFixture<D: PageDriver = ChromeDriver> {
    config: SmokeConfig,
    server: StaticServer,
    driver: D,
}

impl SmokeFixture<ChromeDriver> {
    /// Starts the server, then launches Chromium. A launch failure stops the
    /// server before the error is returned.
    pub async fn setup(config: SmokeConfig) -> Result<Self> {
        let server = StaticServer::start(&config.server).await?;
        let driver = match ChromeDriver::launch(&config.browser).await {
            Ok(driver) => driver,
            Err(e) => {
                if let Err(stop_err) = server.shutdown().await {
                    tracing::warn!("Failed to stop file server after launch error: {}", stop_err);
                }
                return Err(e);
            }
        };
        Ok(Self {
            config,
            server,
            driver,
        })
    }
}

impl<D: PageDriver> SmokeFixture<D> {
    pub async fn setup_with(config: SmokeConfig, driver: D) -> Result<Self> {
        let server = StaticServer::start(&config.server).await?;
        Ok(Self {
            config,
            server,
            driver,
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn url_for(&self, page: &str) -> Result<Url> {
        let mut addr = self.server.local_addr();
        // A wildcard listener is reached through loopback.
        match addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => addr.set_ip(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            IpAddr::V6(ip) if ip.is_unspecified() => addr.set_ip(IpAddr::V6(Ipv6Addr::LOCALHOST)),
            _ => {}
        }

        let base = Url::parse(&format!("http://{}/", addr))
            .map_err(|e| SmokeError::Config(format!("invalid server address {}: {}", addr, e)))?;
        base.join(page.trim_start_matches('/'))
            .map_err(|e| SmokeError::Config(format!("invalid page path {:?}: {}", page, e)))
    }

    /// Navigates to `page` and returns its title.
    pub async fn load(&mut self, page: &str) -> Result<String> {
        let url = self.url_for(page)?;
        self.driver.goto(url.as_str()).await?;
        let title = self.driver.title().await?;
        tracing::info!(url = %url, title = %title, "Page loaded");
        Ok(title)
    }

    pub async fn expect_title(&mut self, page: &str, expected: &str) -> Result<String> {
        let title = self.load(page).await?;
        check_title(&title, expected)?;
        Ok(title)
    }

    /// Runs the configured page/title check.
    pub async fn run_check(&mut self) -> Result<String> {
        let page = self.config.check.page.clone();
        let expected = self.config.check.expected_title.clone();
        self.expect_title(&page, &expected).await
    }

    /// Closes the browser, then stops the server. Both are attempted; the
    /// first error wins.
    pub async fn teardown(mut self) -> Result<()> {
        let quit = self.driver.quit().await;
        let stop = self.server.shutdown().await;
        quit.and(stop)
    }
}
