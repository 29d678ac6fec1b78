//! Where listing pages come from: the live site or a saved HTML file.

use std::path::PathBuf;

use anyhow::Context;
use swatch_core::ScraperSettings;
use swatch_scraper::{FetchedPage, PageClient};

pub(crate) trait PageSource {
    /// Returns the markup for `url` and the URL it was served from.
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage>;

    /// Whether links found in a page's pagination block can be fetched.
    fn follows_pagination(&self) -> bool {
        true
    }
}

pub(crate) struct HttpPageSource {
    client: PageClient,
}

impl HttpPageSource {
    pub(crate) fn new(settings: &ScraperSettings, proxy: Option<&str>) -> anyhow::Result<Self> {
        let client = PageClient::new(
            settings.timeout_secs,
            &settings.user_agent,
            settings.max_retries,
            settings.backoff_base_secs,
            proxy,
        )
        .context("failed to build page client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage> {
        self.client
            .fetch(url)
            .await
            .with_context(|| format!("failed to fetch {url}"))
    }
}

/// Serves one saved page for whatever URL is asked for.
pub(crate) struct FilePageSource {
    path: PathBuf,
}

impl FilePageSource {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PageSource for FilePageSource {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read saved page {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), bytes = html.len(), "loaded saved page");
        Ok(FetchedPage {
            html,
            url: url.to_owned(),
        })
    }

    fn follows_pagination(&self) -> bool {
        false
    }
}
