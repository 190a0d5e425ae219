#![allow(dead_code)]

use async_trait::async_trait;
use inverse_smoke::{PageDriver, SmokeConfig, SmokeError};
use regex::Regex;
use std::path::PathBuf;

pub fn manifest_path(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
}

/// Default check settings serving `rel` on an ephemeral port.
pub fn ephemeral_config(rel: &str) -> SmokeConfig {
    SmokeConfig::default()
        .with_root(manifest_path(rel))
        .with_port(0)
}

/// Fetches pages over plain HTTP and reads `<title>` from the body. Stands
/// in for a browser where Chromium is unavailable.
pub struct HttpTitleDriver {
    client: reqwest::Client,
    title_re: Regex,
    body: Option<String>,
    pub last_status: Option<u16>,
}

impl HttpTitleDriver {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .no_proxy()
            .pool_max_idle_per_host(0)
            .build()
            .expect("http client");
        Self {
            client,
            title_re: Regex::new(r"(?is)<title>(.*?)</title>").expect("title regex"),
            body: None,
            last_status: None,
        }
    }
}

#[async_trait]
impl PageDriver for HttpTitleDriver {
    async fn goto(&mut self, url: &str) -> Result<(), SmokeError> {
        let nav_err = |e: reqwest::Error| SmokeError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let response = self.client.get(url).send().await.map_err(nav_err)?;
        self.last_status = Some(response.status().as_u16());
        self.body = Some(response.text().await.map_err(nav_err)?);
        Ok(())
    }

    async fn title(&mut self) -> Result<String, SmokeError> {
        let body = self.body.as_deref().unwrap_or_default();
        Ok(self
            .title_re
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default())
    }

    async fn quit(&mut self) -> Result<(), SmokeError> {
        self.body = None;
        Ok(())
    }
}
