mod logging;
mod pipeline;
mod source;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use swatch_core::AppConfig;

use crate::pipeline::RunOptions;
use crate::source::{FilePageSource, HttpPageSource, PageSource};

/// Conventional exit status after SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "swatch")]
#[command(about = "Collect brand imagery and PANTONE color references from fashion listing pages")]
struct Cli {
    /// YAML configuration file; missing means built-in defaults.
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Directory for JSON/CSV exports.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Directory for downloaded images.
    #[arg(short, long)]
    image_dir: Option<PathBuf>,

    /// Listing page to start from.
    #[arg(short, long)]
    url: Option<String>,

    /// Read a saved HTML page instead of fetching.
    #[arg(long)]
    html_file: Option<PathBuf>,

    /// Follow pagination links up to this many pages.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: u32,

    /// Extract and export without downloading images.
    #[arg(long)]
    no_download: bool,

    /// Fetch and extract only; write nothing.
    #[arg(long)]
    dry_run: bool,

    /// Shorthand for a `debug` log level.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.download.output_dir.clone_from(dir);
        }
        if let Some(dir) = &self.image_dir {
            config.download.image_dir.clone_from(dir);
        }
        if let Some(url) = &self.url {
            config.scraper.base_url.clone_from(url);
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            max_pages: self.max_pages as usize,
            download: !self.no_download,
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run_cli(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "run failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(cli: &Cli) -> anyhow::Result<ExitCode> {
    let mut config = swatch_core::load_app_config(Some(&cli.config))
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);

    let _log_guard = logging::init(&config.logging, cli.debug)?;
    if !cli.config.exists() {
        tracing::warn!(path = %cli.config.display(), "config file not found, using defaults");
    }
    tracing::debug!(?config, "configuration loaded");

    let options = cli.run_options();
    match &cli.html_file {
        Some(path) => {
            let source = FilePageSource::new(path.clone());
            run_until_interrupted(&config, &source, &options).await
        }
        None => {
            let source = HttpPageSource::new(&config.scraper, config.proxy.active_url())?;
            run_until_interrupted(&config, &source, &options).await
        }
    }
}

async fn run_until_interrupted<S: PageSource>(
    config: &AppConfig,
    source: &S,
    options: &RunOptions,
) -> anyhow::Result<ExitCode> {
    tokio::select! {
        summary = pipeline::run(config, source, options) => {
            let summary = summary?;
            if summary.records == 0 {
                tracing::warn!("no records were extracted");
            }
            if let Some(stats) = summary.downloads {
                tracing::info!(
                    downloaded = stats.downloaded,
                    failed = stats.failed,
                    "images saved to {}",
                    config.download.image_dir.display()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            tracing::warn!("interrupted, in-flight downloads abandoned");
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
    }
}
