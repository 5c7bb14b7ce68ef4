//! Environment-driven configuration for the tracker binary.

use std::env;
use std::path::PathBuf;

use log::LevelFilter;
use tracker_engine::CompletionSettings;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_LEDGER_PATH: &str = "job_applications.csv";
const DEFAULT_MAILBOX_PATH: &str = "mailbox.json";

/// Settings assembled from `.env` and the process environment.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub ledger_path: PathBuf,
    pub mailbox_path: PathBuf,
    pub log_level: LevelFilter,
}

impl TrackerConfig {
    /// Loads `.env` when present, then reads the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let ledger_path = env::var("TRACKER_LEDGER_PATH")
            .unwrap_or_else(|_| DEFAULT_LEDGER_PATH.to_string())
            .into();
        let mailbox_path = env::var("TRACKER_MAILBOX_PATH")
            .unwrap_or_else(|_| DEFAULT_MAILBOX_PATH.to_string())
            .into();
        let raw_level = env::var("TRACKER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_level = raw_level
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::InvalidLogLevel(raw_level.clone()))?;

        Ok(Self {
            api_key,
            base_url,
            model,
            ledger_path,
            mailbox_path,
            log_level,
        })
    }

    /// Chat-completions settings; requires an API key.
    pub fn completion_settings(&self) -> Result<CompletionSettings, ConfigError> {
        let api_key = self.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        Ok(CompletionSettings {
            base_url: self.base_url.clone(),
            api_key,
            model: self.model.clone(),
            ..CompletionSettings::default()
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY must be set unless --dry-run is given")]
    MissingApiKey,
    #[error("TRACKER_LOG_LEVEL '{0}' is not one of off, error, warn, info, debug, trace")]
    InvalidLogLevel(String),
}
