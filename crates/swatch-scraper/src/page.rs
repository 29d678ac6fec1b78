//! HTTP client for listing pages.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Seconds to wait on a 429 without a usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// A fetched page body together with the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    /// Final URL after redirects.
    pub url: String,
}

/// Fetches listing pages with browser-like headers.
///
/// 429 responses, transport failures and 5xx statuses are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct PageClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PageClient {
    /// Creates a client with the given timeout, `User-Agent`, retry policy and
    /// optional proxy.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `proxy` is not a usable proxy URL.
    /// - [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
        proxy: Option<&str>,
    ) -> Result<Self, ScraperError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent);

        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| ScraperError::InvalidUrl {
                url: "[proxy]".to_owned(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches `url`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` is not an absolute URL.
    /// - [`ScraperError::RateLimited`] on HTTP 429 after all retries.
    /// - [`ScraperError::NotFound`] on HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status
    ///   (5xx retried, 4xx not).
    /// - [`ScraperError::Http`] on network failure after all retries.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let parsed = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let referer = format!("{}/", parsed.origin().ascii_serialization());
        let domain = parsed.host_str().unwrap_or_default().to_owned();

        tracing::debug!(url, "fetching page");
        let page = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.to_owned();
            let referer = referer.clone();
            let domain = domain.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .header(reqwest::header::REFERER, &referer)
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                    return Err(ScraperError::RateLimited {
                        domain,
                        retry_after_secs,
                    });
                }

                if status == StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let final_url = response.url().to_string();
                let html = response.text().await?;
                Ok(FetchedPage {
                    html,
                    url: final_url,
                })
            }
        })
        .await?;

        tracing::info!(url = %page.url, bytes = page.html.len(), "page fetched");
        Ok(page)
    }
}
