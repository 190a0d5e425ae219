use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::task::{self, JoinHandle};

// Import chromiumoxide for CDP automation
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::Page;
use futures::StreamExt;

use crate::config::BrowserConfig;
use crate::error::{Result, SmokeError};

/// The browser operations the smoke fixture needs.
#[async_trait]
pub trait PageDriver: Send {
    /// Load `url` and block until navigation completes.
    async fn goto(&mut self, url: &str) -> Result<()>;
    /// Title of the current document, empty when it has none.
    async fn title(&mut self) -> Result<String>;
    async fn quit(&mut self) -> Result<()>;
}

pub fn launch_config(config: &BrowserConfig) -> Result<LaunchConfig> {
    let mut builder = LaunchConfig::builder();
    if !config.headless {
        builder = builder.with_head();
    }
    if !config.sandbox {
        builder = builder.no_sandbox();
    }
    if let Some(path) = &config.executable {
        builder = builder.chrome_executable(path);
    }
    if let Some(limit) = config.launch_timeout() {
        builder = builder.launch_timeout(limit);
    }
    builder.build().map_err(SmokeError::BrowserLaunch)
}

async fn with_timeout<T, F>(limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| SmokeError::Timeout(limit))?,
        None => fut.await,
    }
}

/// Chromium driven over the DevTools protocol.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Option<Duration>,
    closed: bool,
}

impl ChromeDriver {
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let launch = launch_config(config)?;

        let (browser, mut handler) = Browser::launch(launch)
            .await
            .map_err(|e| SmokeError::BrowserLaunch(e.to_string()))?;

        // The connection stalls unless CDP events are drained.
        let handler_task = task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(SmokeError::BrowserLaunch(format!(
                    "failed to create initial page: {}",
                    e
                )));
            }
        };

        tracing::info!(headless = config.headless, "Browser launched");

        Ok(Self {
            browser,
            page,
            handler_task,
            navigation_timeout: config.navigation_timeout(),
            closed: false,
        })
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn goto(&mut self, url: &str) -> Result<()> {
        let page = &self.page;
        let navigate = async {
            page.goto(url).await.map_err(|e| SmokeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
            page.wait_for_navigation()
                .await
                .map_err(|e| SmokeError::Navigation {
                    url: url.to_string(),
                    reason: format!("wait for navigation failed: {}", e),
                })?;
            Ok::<(), SmokeError>(())
        };

        with_timeout(self.navigation_timeout, navigate).await?;
        tracing::debug!(url, "Navigation finished");
        Ok(())
    }

    async fn title(&mut self) -> Result<String> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| SmokeError::Driver(format!("failed to read title: {}", e)))?;
        Ok(title.unwrap_or_default())
    }

    async fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.browser
            .close()
            .await
            .map_err(|e| SmokeError::Driver(format!("failed to close browser: {}", e)))?;
        self.browser.wait().await?;
        self.handler_task.abort();

        tracing::info!("Browser closed");
        Ok(())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
