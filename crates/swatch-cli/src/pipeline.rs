//! One scraping run: pages in, records out, media saved, exports written.
//!
//! Extraction and per-item download failures never abort a run. Fatal errors
//! are limited to the first page failing, directories that cannot be created
//! and exports that cannot be written.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use swatch_core::{write_csv, write_json, AppConfig, BrandRecord, ScraperSettings};
use swatch_scraper::{
    extract_pagination_links, AssetRetriever, ContentExtractor, RetrievalStats, RetrieverConfig,
};

use crate::source::PageSource;

pub(crate) const JSON_EXPORT: &str = "pantone_data.json";
pub(crate) const CSV_EXPORT: &str = "pantone_data.csv";
pub(crate) const DEBUG_PAGE: &str = "debug_page.html";

#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    pub max_pages: usize,
    pub download: bool,
    pub dry_run: bool,
}

#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    pub pages: usize,
    pub records: usize,
    pub colors: usize,
    pub downloads: Option<RetrievalStats>,
}

pub(crate) async fn run<S: PageSource>(
    config: &AppConfig,
    source: &S,
    options: &RunOptions,
) -> anyhow::Result<RunSummary> {
    let output_dir = config.download.output_dir.as_path();
    let image_dir = config.download.image_dir.as_path();

    if !options.dry_run {
        ensure_dir(output_dir).await?;
        if options.download {
            ensure_dir(image_dir).await?;
        }
    }

    let extractor = ContentExtractor::new(&config.scraper.site_url);
    let (mut records, pages) = collect_records(config, source, &extractor, options).await?;

    let downloads = if !options.download {
        tracing::info!("media download disabled");
        None
    } else if options.dry_run {
        let pending = media_references(&records).len();
        tracing::info!(pending, "dry run: skipping media download");
        None
    } else {
        Some(download_media(config, &mut records).await?)
    };

    if options.dry_run {
        tracing::info!(records = records.len(), "dry run: skipping export");
    } else {
        export(&records, output_dir)?;
    }

    let summary = RunSummary {
        pages,
        records: records.len(),
        colors: records.iter().map(|r| r.colors().len()).sum(),
        downloads,
    };
    tracing::info!(
        pages = summary.pages,
        records = summary.records,
        colors = summary.colors,
        output_dir = %output_dir.display(),
        image_dir = %image_dir.display(),
        "run complete"
    );
    Ok(summary)
}

/// Walks listing pages breadth-first from the configured start URL, up to
/// `options.max_pages` fetch attempts.
async fn collect_records<S: PageSource>(
    config: &AppConfig,
    source: &S,
    extractor: &ContentExtractor,
    options: &RunOptions,
) -> anyhow::Result<(Vec<BrandRecord>, usize)> {
    let mut queue = VecDeque::from([config.scraper.base_url.clone()]);
    let mut visited: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    let mut attempted = 0usize;
    let mut fetched = 0usize;

    while attempted < options.max_pages.max(1) {
        let Some(url) = queue.pop_front() else {
            break;
        };
        if !visited.insert(url.clone()) {
            continue;
        }

        if attempted > 0 {
            polite_delay(&config.scraper).await;
        }
        attempted += 1;

        let page = match source.fetch(&url).await {
            Ok(page) => page,
            Err(e) if attempted == 1 => return Err(e),
            Err(e) => {
                tracing::warn!(url = %url, error = %format!("{e:#}"), "skipping page");
                continue;
            }
        };
        fetched += 1;
        visited.insert(page.url.clone());

        let found = extractor.extract(&page.html, &page.url);
        if found.is_empty() {
            tracing::warn!(url = %page.url, "no records found on page");
            if !options.dry_run {
                save_debug_page(&config.download.output_dir, &page.html).await;
            }
        } else {
            tracing::info!(url = %page.url, records = found.len(), "page extracted");
        }
        records.extend(found);

        if source.follows_pagination() && attempted < options.max_pages {
            for link in extract_pagination_links(&page.html, &page.url) {
                if !visited.contains(&link) && !queue.contains(&link) {
                    queue.push_back(link);
                }
            }
        }
    }

    Ok((records, fetched))
}

async fn polite_delay(settings: &ScraperSettings) {
    let min_ms = settings.delay_min_secs.saturating_mul(1000);
    let max_ms = settings.delay_max_secs.saturating_mul(1000).max(min_ms);
    let wait_ms = rand::random_range(min_ms..=max_ms);
    tracing::debug!(wait_ms, "waiting before next page");
    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
}

/// Non-empty media references in record order, without duplicates.
fn media_references(records: &[BrandRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(BrandRecord::media_reference)
        .filter(|r| !r.trim().is_empty())
        .filter(|r| seen.insert(*r))
        .map(str::to_owned)
        .collect()
}

async fn download_media(
    config: &AppConfig,
    records: &mut [BrandRecord],
) -> anyhow::Result<RetrievalStats> {
    let references = media_references(records);
    if references.is_empty() {
        tracing::info!("no media to download");
        return Ok(RetrievalStats::default());
    }

    let retriever = AssetRetriever::new(RetrieverConfig {
        target_dir: config.download.image_dir.clone(),
        max_concurrent: config.download.concurrent_downloads,
        timeout_secs: config.scraper.timeout_secs,
        user_agent: config.scraper.user_agent.clone(),
        referer: config.scraper.site_url.clone(),
        proxy: config.proxy.active_url().map(str::to_owned),
    })
    .context("failed to build media retriever")?;

    let saved = retriever
        .retrieve_all(&references)
        .await
        .context("media download failed")?;

    for record in records.iter_mut() {
        let local = saved
            .get(record.media_reference())
            .and_then(Option::as_ref)
            .map(|path| path.display().to_string());
        if let Some(local) = local {
            record.attach_local_path(local);
        }
    }

    Ok(retriever.get_stats())
}

fn export(records: &[BrandRecord], output_dir: &Path) -> anyhow::Result<()> {
    let json_path = output_dir.join(JSON_EXPORT);
    write_json(records, &json_path)
        .with_context(|| format!("failed to export {}", json_path.display()))?;

    let csv_path = output_dir.join(CSV_EXPORT);
    write_csv(records, &csv_path)
        .with_context(|| format!("failed to export {}", csv_path.display()))?;

    tracing::info!(
        records = records.len(),
        json = %json_path.display(),
        csv = %csv_path.display(),
        "records exported"
    );
    Ok(())
}

async fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create directory {}", dir.display()))
}

async fn save_debug_page(output_dir: &Path, html: &str) {
    let path = output_dir.join(DEBUG_PAGE);
    match tokio::fs::write(&path, html).await {
        Ok(()) => tracing::warn!(path = %path.display(), "saved page for inspection"),
        Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to save debug page"),
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
