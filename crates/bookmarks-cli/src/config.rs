// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use bookmarks_app::{
    DEFAULT_SORT_DIRECTION, DEFAULT_SORT_FIELD, PageSizeOptions, SortDirection, SortField,
    SortSpec, ViewDefaults,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const CONFIG_PATH_ENV: &str = "BOOKMARKS_CONFIG_PATH";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_REVALIDATE: &str = "1h";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            ui: Ui::default(),
            data: Data::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub page_size_options: Option<Vec<i64>>,
    pub initial_page_size: Option<i64>,
    pub archive_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    pub revalidate: Option<String>,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            revalidate: Some(DEFAULT_REVALIDATE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(bookmarks_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [storage], [ui], [data], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            bookmarks_db::validate_db_path(db_path)?;
        }

        if let Some(raw) = &self.data.revalidate {
            let parsed = parse_duration(raw)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "data.revalidate in {} must be positive, got {}",
                    path.display(),
                    raw
                );
            }
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level in {} is not a valid filter (try \"warn\" or \"bookmarks_db=debug\")",
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => bookmarks_db::default_db_path(),
        }
    }

    /// Configured default sort, with optional command-line overrides. Values
    /// that do not name a column or direction fall back rather than fail.
    pub fn default_sort(&self, field: Option<&str>, direction: Option<&str>) -> SortSpec {
        let configured = SortSpec::new(
            SortField::normalize(self.ui.sort_field.as_deref(), DEFAULT_SORT_FIELD),
            SortDirection::normalize(self.ui.sort_direction.as_deref(), DEFAULT_SORT_DIRECTION),
        );
        SortSpec::new(
            SortField::normalize(field, configured.field),
            SortDirection::normalize(direction, configured.direction),
        )
    }

    pub fn view_defaults(&self, sort: SortSpec) -> ViewDefaults {
        let page_size_options = self
            .ui
            .page_size_options
            .as_deref()
            .map(PageSizeOptions::normalize)
            .unwrap_or_default();
        ViewDefaults {
            sort,
            page_size_options,
            initial_page_size: self.ui.initial_page_size,
        }
    }

    pub fn revalidate_interval(&self) -> Result<Duration> {
        parse_duration(self.data.revalidate.as_deref().unwrap_or(DEFAULT_REVALIDATE))
    }

    pub fn archive_base_url(&self) -> Option<&str> {
        self.ui
            .archive_base_url
            .as_deref()
            .map(|base| base.trim_end_matches('/'))
            .filter(|base| !base.is_empty())
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log.file.as_deref()
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# bookmarks config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/bookmarks/bookmarks.db)\n# db_path = \"/absolute/path/to/bookmarks.db\"\n\n[ui]\nsort_field = \"{}\"\nsort_direction = \"{}\"\npage_size_options = [25, 50, 100]\ninitial_page_size = 25\n# archive_base_url = \"https://archive.example.com/articles\"\n\n[data]\nrevalidate = \"{}\"\n\n[log]\nlevel = \"{}\"\n# file = \"/absolute/path/to/bookmarks.log\"\n",
            path.display(),
            DEFAULT_SORT_FIELD.as_str(),
            DEFAULT_SORT_DIRECTION.as_str(),
            DEFAULT_REVALIDATE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let invalid = || format!("invalid duration {raw:?}");
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value.parse().with_context(invalid)?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value.parse().with_context(invalid)?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value.parse().with_context(invalid)?;
        return Ok(Duration::from_secs(mins.saturating_mul(60)));
    }
    if let Some(value) = raw.strip_suffix('h') {
        let hours: u64 = value.parse().with_context(invalid)?;
        return Ok(Duration::from_secs(hours.saturating_mul(3600)));
    }

    bail!(
        "invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m, <N>h (for example 30m or 1h)"
    )
}
