use std::path::{Path, PathBuf};

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Upper bound for `download.concurrent_downloads`.
pub const MAX_CONCURRENT_DOWNLOADS: usize = 64;

/// Load configuration from an optional YAML file plus environment overrides.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
/// A `path` that does not exist yields the built-in defaults; callers that
/// care should check for the file themselves and warn.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, an override is
/// malformed, or the merged configuration fails validation.
pub fn load_app_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_with(path, |key| std::env::var(key))
}

/// Load configuration using the provided env-var lookup function.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, so tests can
/// drive it with a pure `HashMap` lookup.
///
/// # Errors
///
/// Same as [`load_app_config`].
pub fn load_app_config_with<F>(path: Option<&Path>, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let base = match path {
        Some(p) if p.exists() => read_config_file(p)?,
        _ => AppConfig::default(),
    };
    let config = apply_env_overrides(base, lookup)?;
    validate(&config)?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_config(&content)
}

/// Parse YAML text; keys absent from the document keep their defaults.
fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let get = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());

    let parse_u32 = |var: &str, raw: &str| -> Result<u32, ConfigError> {
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, raw: &str| -> Result<u64, ConfigError> {
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, raw: &str| -> Result<usize, ConfigError> {
        raw.trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    if let Some(v) = get("SWATCH_BASE_URL") {
        config.scraper.base_url = v;
    }
    if let Some(v) = get("SWATCH_SITE_URL") {
        config.scraper.site_url = v;
    }
    if let Some(v) = get("SWATCH_USER_AGENT") {
        config.scraper.user_agent = v;
    }
    if let Some(v) = get("SWATCH_TIMEOUT_SECS") {
        config.scraper.timeout_secs = parse_u64("SWATCH_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = get("SWATCH_MAX_RETRIES") {
        config.scraper.max_retries = parse_u32("SWATCH_MAX_RETRIES", &v)?;
    }
    if let Some(v) = get("SWATCH_IMAGE_DIR") {
        config.download.image_dir = PathBuf::from(v);
    }
    if let Some(v) = get("SWATCH_OUTPUT_DIR") {
        config.download.output_dir = PathBuf::from(v);
    }
    if let Some(v) = get("SWATCH_CONCURRENT_DOWNLOADS") {
        config.download.concurrent_downloads = parse_usize("SWATCH_CONCURRENT_DOWNLOADS", &v)?;
    }
    if let Some(v) = get("SWATCH_PROXY_URL") {
        config.proxy.enabled = true;
        config.proxy.url = v;
    }
    if let Some(v) = get("SWATCH_LOG_LEVEL") {
        config.logging.level = v;
    }

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if !(1..=MAX_CONCURRENT_DOWNLOADS).contains(&config.download.concurrent_downloads) {
        return Err(ConfigError::Validation(format!(
            "download.concurrent_downloads must be between 1 and {MAX_CONCURRENT_DOWNLOADS}, got {}",
            config.download.concurrent_downloads
        )));
    }
    if config.scraper.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "scraper.timeout_secs must be at least 1".to_string(),
        ));
    }
    if config.scraper.delay_min_secs > config.scraper.delay_max_secs {
        return Err(ConfigError::Validation(format!(
            "scraper.delay_min_secs ({}) exceeds scraper.delay_max_secs ({})",
            config.scraper.delay_min_secs, config.scraper.delay_max_secs
        )));
    }
    if !is_absolute_http_url(&config.scraper.site_url) {
        return Err(ConfigError::Validation(format!(
            "scraper.site_url '{}' must be an absolute http(s) URL",
            config.scraper.site_url
        )));
    }
    if config.proxy.enabled && config.proxy.url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "proxy.enabled is set but proxy.url is empty".to_string(),
        ));
    }
    Ok(())
}

fn is_absolute_http_url(raw: &str) -> bool {
    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"));
    rest.is_some_and(|r| !r.is_empty() && !r.starts_with('/'))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
