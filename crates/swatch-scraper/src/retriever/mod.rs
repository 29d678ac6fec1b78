//! Concurrent media downloads into a local directory.
//!
//! All references in one [`AssetRetriever::retrieve_all`] call are dispatched
//! together and gated by a semaphore sized to `max_concurrent`. A reference
//! resolved earlier in the run is answered from memory, and a file already on
//! disk under the exact resolved name is reused without a request. Bodies are
//! read fully into memory and written under a temporary name before being
//! renamed into place, so an aborted batch never leaves a truncated file at a
//! final path.

mod stats;

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, StatusCode};
use tokio::sync::Semaphore;

use crate::error::ScraperError;
use crate::filename::{resolve_filename, resolve_unique_path_with};

pub use stats::RetrievalStats;
use stats::RetrievalState;

/// Bodies smaller than this without an image content type are suspicious.
const SUSPICIOUS_BODY_BYTES: usize = 1000;

/// Settings for one [`AssetRetriever`].
///
/// Built by the caller from the application's download and scraper settings;
/// the retriever never reads configuration files itself.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Directory downloads are written to; created on first use.
    pub target_dir: PathBuf,
    /// Maximum number of fetches in flight at once. Zero is treated as one
    /// and values above [`Semaphore::MAX_PERMITS`] are clamped.
    pub max_concurrent: usize,
    /// Whole-request timeout; an expired fetch counts as a failure.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Sent as `Referer` on every request.
    pub referer: String,
    pub proxy: Option<String>,
}

/// Where a reference's file will live.
enum Target {
    /// A file with the exact resolved name was already on disk.
    Existing(PathBuf),
    /// A fresh path claimed for this fetch.
    Fresh(PathBuf),
}

/// Downloads media references into [`RetrieverConfig::target_dir`].
///
/// One instance is meant to live for a whole run. Its history (reference to
/// local path) survives across [`retrieve_all`](Self::retrieve_all) calls, so a
/// reference resolved in an earlier batch is answered without a request.
/// The `downloaded`/`failed` counters are shared by every in-flight fetch and
/// are updated under the same lock as the history.
pub struct AssetRetriever {
    client: Client,
    config: RetrieverConfig,
    limiter: Semaphore,
    state: Mutex<RetrievalState>,
}

impl AssetRetriever {
    /// Builds a retriever with its own HTTP client.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if the configured proxy is unusable.
    /// - [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(config: RetrieverConfig) -> Result<Self, ScraperError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str());

        if let Some(proxy) = config.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| ScraperError::InvalidUrl {
                url: "[proxy]".to_owned(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
            limiter: Semaphore::new(config.max_concurrent.clamp(1, Semaphore::MAX_PERMITS)),
            config,
            state: Mutex::new(RetrievalState::default()),
        })
    }

    /// The settings this retriever was built with.
    #[must_use]
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Fetches every reference and returns where each one ended up locally.
    ///
    /// Every input reference appears in the returned map; failed ones map to
    /// `None`. Individual failures are logged and counted, never returned.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::TargetDir`] if the target directory cannot be
    /// created.
    pub async fn retrieve_all(
        &self,
        references: &[String],
    ) -> Result<HashMap<String, Option<PathBuf>>, ScraperError> {
        if references.is_empty() {
            return Ok(HashMap::new());
        }

        let dir = &self.config.target_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| ScraperError::TargetDir {
                path: dir.display().to_string(),
                source,
            })?;

        let mut unique = HashSet::new();
        let batch: Vec<&str> = references
            .iter()
            .map(String::as_str)
            .filter(|r| unique.insert(*r))
            .collect();

        tracing::info!(count = batch.len(), dir = %dir.display(), "starting media download batch");

        let outcomes = join_all(batch.iter().map(|reference| async move {
            (reference.to_string(), self.retrieve_one(reference).await)
        }))
        .await;

        let stats = self.get_stats();
        tracing::info!(
            downloaded = stats.downloaded,
            failed = stats.failed,
            total = stats.total,
            "media download batch finished"
        );

        Ok(outcomes.into_iter().collect())
    }

    /// Current counters, read atomically.
    #[must_use]
    pub fn get_stats(&self) -> RetrievalStats {
        self.lock_state().stats()
    }

    /// Zeroes both counters together. History is kept.
    pub fn reset_stats(&self) {
        self.lock_state().reset_counters();
    }

    async fn retrieve_one(&self, reference: &str) -> Option<PathBuf> {
        let cached = self.lock_state().cached(reference);
        if let Some(path) = cached {
            tracing::debug!(url = reference, path = %path.display(), "already retrieved in this run");
            return Some(path);
        }

        // The semaphore is never closed, so acquiring cannot fail in practice.
        let Ok(_permit) = self.limiter.acquire().await else {
            self.lock_state().record_failure(None);
            return None;
        };

        let path = match self.claim_target(reference) {
            Target::Existing(path) => {
                tracing::debug!(url = reference, path = %path.display(), "file already present, skipping");
                return Some(path);
            }
            Target::Fresh(path) => path,
        };

        tracing::debug!(url = reference, path = %path.display(), "downloading");
        match self.download(reference, &path).await {
            Ok(bytes) => {
                self.lock_state().record_success(reference, path.clone());
                tracing::info!(url = reference, path = %path.display(), bytes, "downloaded");
                Some(path)
            }
            Err(err) => {
                self.lock_state().record_failure(Some(path.as_path()));
                match &err {
                    ScraperError::SaveFile { .. } => {
                        tracing::error!(url = reference, error = %err, "download could not be saved");
                    }
                    _ => tracing::warn!(url = reference, error = %err, "download failed"),
                }
                None
            }
        }
    }

    /// Picks the local path for `reference` under the state lock, so two
    /// concurrent fetches never claim the same path.
    ///
    /// A file already on disk under the exact name is reused only by the
    /// first reference that asks for it in this run.
    fn claim_target(&self, reference: &str) -> Target {
        let dir = &self.config.target_dir;
        let name = resolve_filename(reference);
        let mut state = self.lock_state();

        let exact = dir.join(&name);
        if exact.exists() && !state.is_claimed(&exact) {
            // Claimed so a second reference with the same name probes a suffix.
            state.claim(exact.clone());
            state.record_existing(reference, exact.clone());
            return Target::Existing(exact);
        }

        let path = resolve_unique_path_with(dir, &name, |p| state.is_claimed(p) || p.exists());
        state.claim(path.clone());
        Target::Fresh(path)
    }

    async fn download(&self, url: &str, path: &Path) -> Result<usize, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::REFERER, &self.config.referer)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }
        if status != StatusCode::OK {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let body = response.bytes().await?;

        if !content_type.contains("image") && body.len() < SUSPICIOUS_BODY_BYTES {
            tracing::warn!(
                url,
                content_type = %content_type,
                bytes = body.len(),
                "downloaded content may not be an image"
            );
        }

        write_atomically(path, &body).await?;
        Ok(body.len())
    }

    fn lock_state(&self) -> MutexGuard<'_, RetrievalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writes `body` next to `path` and renames it into place.
async fn write_atomically(path: &Path, body: &[u8]) -> Result<(), ScraperError> {
    let mut partial = OsString::from(path.as_os_str());
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let written: std::io::Result<()> = async {
        tokio::fs::write(&partial, body).await?;
        tokio::fs::rename(&partial, path).await
    }
    .await;

    match written {
        Ok(()) => Ok(()),
        Err(source) => {
            let _ = tokio::fs::remove_file(&partial).await;
            Err(ScraperError::SaveFile {
                path: path.display().to_string(),
                source,
            })
        }
    }
}
