pub mod app_config;
pub mod config;
pub mod export;
pub mod models;

use thiserror::Error;

pub use app_config::{AppConfig, DownloadSettings, LoggingSettings, ProxySettings, ScraperSettings};
pub use config::{load_app_config, load_app_config_with};
pub use export::{write_csv, write_json, ExportError};
pub use models::{BrandRecord, ColorIdentifier, UNKNOWN_BRAND};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ConfigFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ConfigFileParse(#[from] serde_yaml::Error),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("config validation error: {0}")]
    Validation(String),
}
