//! Runtime configuration loaded from environment variables.
//!
//! Every setting has a default so a bare environment yields an in-memory
//! deployment that stores assets under `./assets`.

use crate::task::services::{LayoutRendering, ParseLayoutRenderingError};
use camino::Utf8PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default photo processor base URL.
pub const DEFAULT_ALGO_URL: &str = "http://127.0.0.1:8080";

/// Default photo processor timeout in seconds.
pub const DEFAULT_ALGO_TIMEOUT_SECS: u64 = 15;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `PERMIT_LAYOUT_RENDERING` is neither `local` nor `remote`.
    #[error(transparent)]
    LayoutRendering(#[from] ParseLayoutRenderingError),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deployment name, `dev` by default.
    pub environment: String,
    /// Directory receiving generated assets.
    pub assets_dir: Utf8PathBuf,
    /// Public base URL prefixed to asset references; may be empty.
    pub assets_public_url: String,
    /// Directory holding uploaded source photos.
    pub uploads_dir: Utf8PathBuf,
    /// Photo processor base URL.
    pub algo_url: String,
    /// Photo processor request timeout.
    pub algo_timeout: Duration,
    /// Where layout sheets are rendered.
    pub layout_rendering: LayoutRendering,
    /// Whether payment intents come from the sandbox gateway.
    pub pay_mock: bool,
    /// Merchant application id reported in payment intents.
    pub wechat_app_id: String,
    /// `tracing` filter directive, e.g. `info` or `permit=debug`.
    pub log_filter: String,
    /// Emit newline-delimited JSON logs.
    pub log_json: bool,
    /// `PostgreSQL` DSN; `None` selects in-memory repositories.
    pub postgres_dsn: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "dev".to_owned(),
            assets_dir: Utf8PathBuf::from("./assets"),
            assets_public_url: String::new(),
            uploads_dir: Utf8PathBuf::from("./uploads"),
            algo_url: DEFAULT_ALGO_URL.to_owned(),
            algo_timeout: Duration::from_secs(DEFAULT_ALGO_TIMEOUT_SECS),
            layout_rendering: LayoutRendering::Local,
            pay_mock: true,
            wechat_app_id: String::new(),
            log_filter: "info".to_owned(),
            log_json: true,
            postgres_dsn: None,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset. Unparseable numbers and flags keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the layout rendering mode is unknown.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let layout_rendering = match read("PERMIT_LAYOUT_RENDERING") {
            Some(mode) => LayoutRendering::try_from(mode.as_str())?,
            None => defaults.layout_rendering,
        };
        let timeout_secs = read("PERMIT_ALGO_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_ALGO_TIMEOUT_SECS);

        Ok(Self {
            environment: read("PERMIT_ENV").unwrap_or(defaults.environment),
            assets_dir: read("PERMIT_ASSETS_DIR").map_or(defaults.assets_dir, Utf8PathBuf::from),
            assets_public_url: read("PERMIT_ASSETS_PUBLIC_URL")
                .unwrap_or(defaults.assets_public_url),
            uploads_dir: read("PERMIT_UPLOADS_DIR")
                .map_or(defaults.uploads_dir, Utf8PathBuf::from),
            algo_url: read("PERMIT_ALGO_URL").unwrap_or(defaults.algo_url),
            algo_timeout: Duration::from_secs(timeout_secs),
            layout_rendering,
            pay_mock: read("PERMIT_PAY_MOCK")
                .and_then(|value| parse_flag(&value))
                .unwrap_or(defaults.pay_mock),
            wechat_app_id: read("PERMIT_WECHAT_APPID").unwrap_or(defaults.wechat_app_id),
            log_filter: read("PERMIT_LOG").unwrap_or(defaults.log_filter),
            log_json: read("PERMIT_LOG_JSON")
                .and_then(|value| parse_flag(&value))
                .unwrap_or(defaults.log_json),
            postgres_dsn: read("POSTGRES_DSN"),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
