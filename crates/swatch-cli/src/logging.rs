use std::io::IsTerminal;
use std::path::Path;

use anyhow::Context;
use swatch_core::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber: console output plus, when `settings.dir`
/// is set, a plain-text log file named after the start time.
///
/// `RUST_LOG` wins over `--debug`, which wins over the configured level.
/// Keep the returned guard alive until exit or buffered file lines are lost.
pub(crate) fn init(settings: &LoggingSettings, debug: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let level = if debug { "debug" } else { settings.level.as_str() };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level \"{level}\""))?;

    let console = fmt::layer().with_ansi(std::io::stdout().is_terminal());

    let (file_layer, guard) = if settings.dir.trim().is_empty() {
        (None, None)
    } else {
        let (writer, guard) = file_writer(Path::new(settings.dir.trim()))?;
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

fn file_writer(
    dir: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(format!("scraper_{stamp}"))
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("failed to open log file in {}", dir.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}
