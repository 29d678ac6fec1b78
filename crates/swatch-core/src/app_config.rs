use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraper: ScraperSettings,
    pub download: DownloadSettings,
    pub proxy: ProxySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    /// Listing page the run starts from.
    pub base_url: String,
    /// Site root used to resolve relative links and as the `Referer`.
    pub site_url: String,
    pub delay_min_secs: u64,
    pub delay_max_secs: u64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    pub user_agent: String,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.popfashioninfo.com/styles/designerbrand/".to_string(),
            site_url: "https://www.popfashioninfo.com/".to_string(),
            delay_min_secs: 2,
            delay_max_secs: 5,
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_secs: 2,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub image_dir: PathBuf,
    pub output_dir: PathBuf,
    pub concurrent_downloads: usize,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("data/images"),
            output_dir: PathBuf::from("output"),
            concurrent_downloads: 3,
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub enabled: bool,
    pub url: String,
}

impl ProxySettings {
    /// The proxy URL to route requests through, if one is enabled.
    #[must_use]
    pub fn active_url(&self) -> Option<&str> {
        (self.enabled && !self.url.trim().is_empty()).then_some(self.url.trim())
    }
}

impl std::fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxySettings")
            .field("enabled", &self.enabled)
            .field("url", &(!self.url.is_empty()).then_some("[redacted]"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// Directory for the log file; empty disables file logging.
    pub dir: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
        }
    }
}
