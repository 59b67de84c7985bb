use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use client_core::DEFAULT_API_URL;
use serde::Deserialize;
use views::{
    screens::DEFAULT_LOW_STOCK_THRESHOLD, table::DEFAULT_ROWS_PER_PAGE,
    viewport::DEFAULT_MOBILE_BREAKPOINT,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub rows_per_page: usize,
    pub low_stock_threshold: i64,
    pub mobile_breakpoint: u16,
    pub request_timeout_secs: Option<u64>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            request_timeout_secs: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_url: Option<String>,
    rows_per_page: Option<usize>,
    low_stock_threshold: Option<i64>,
    mobile_breakpoint: Option<u16>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Defaults, then the optional toml file, then environment variables.
/// Unparseable numeric variables are ignored.
pub fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid settings file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    if let Some(v) = env("INVENTORY_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(parsed) = env("APP__ROWS_PER_PAGE").and_then(|v| v.parse::<usize>().ok()) {
        settings.rows_per_page = parsed;
    }
    if let Some(parsed) = env("APP__LOW_STOCK_THRESHOLD").and_then(|v| v.parse::<i64>().ok()) {
        settings.low_stock_threshold = parsed;
    }
    if let Some(parsed) = env("APP__MOBILE_BREAKPOINT").and_then(|v| v.parse::<u16>().ok()) {
        settings.mobile_breakpoint = parsed;
    }
    if let Some(parsed) = env("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
        settings.request_timeout_secs = Some(parsed);
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings.rows_per_page = settings.rows_per_page.max(1);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.rows_per_page {
        settings.rows_per_page = v;
    }
    if let Some(v) = file_cfg.low_stock_threshold {
        settings.low_stock_threshold = v;
    }
    if let Some(v) = file_cfg.mobile_breakpoint {
        settings.mobile_breakpoint = v;
    }
    if file_cfg.request_timeout_secs.is_some() {
        settings.request_timeout_secs = file_cfg.request_timeout_secs;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}
