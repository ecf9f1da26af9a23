// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use sesh_app::{DEFAULT_MIN_MILLISECONDS, Mode, Theme};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const CONFIG_PATH_ENV: &str = "SESH_CONFIG_PATH";
const DEFAULT_INPUT_DIR: &str = "sesh";
const DEFAULT_ITEMS_PER_PAGE: usize = 10;
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub history: History,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            history: History::default(),
            ui: Ui::default(),
            storage: Storage::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct History {
    pub input_dir: Option<String>,
    pub min_milliseconds: Option<u64>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            input_dir: Some(DEFAULT_INPUT_DIR.to_owned()),
            min_milliseconds: Some(DEFAULT_MIN_MILLISECONDS),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub items_per_page: Option<usize>,
    pub playtime_mode: Option<bool>,
    pub dark_mode: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            items_per_page: Some(DEFAULT_ITEMS_PER_PAGE),
            playtime_mode: Some(false),
            dark_mode: Some(true),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(sesh_db::APP_NAME);
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
                    "config file {} has no `version`; add `version = 1` and put values under [history], [ui], [storage], and [logging]",
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
        if let Some(input_dir) = &self.history.input_dir
            && input_dir.trim().is_empty()
        {
            bail!(
                "history.input_dir in {} must not be empty; point it at your exported JSON files",
                path.display()
            );
        }

        if let Some(db_path) = &self.storage.db_path {
            sesh_db::validate_db_path(db_path)?;
        }

        if let Some(items) = self.ui.items_per_page
            && items == 0
        {
            bail!(
                "ui.items_per_page in {} must be at least 1",
                path.display()
            );
        }

        if let Some(level) = &self.logging.level
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            bail!(
                "logging.level in {} is {level:?}; use one of: {}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    pub fn input_dir(&self) -> PathBuf {
        PathBuf::from(
            self.history
                .input_dir
                .as_deref()
                .unwrap_or(DEFAULT_INPUT_DIR),
        )
    }

    pub fn min_milliseconds(&self) -> u64 {
        self.history
            .min_milliseconds
            .unwrap_or(DEFAULT_MIN_MILLISECONDS)
    }

    pub fn items_per_page(&self) -> usize {
        self.ui.items_per_page.unwrap_or(DEFAULT_ITEMS_PER_PAGE)
    }

    pub fn initial_mode(&self) -> Mode {
        if self.ui.playtime_mode.unwrap_or(false) {
            Mode::Playtime
        } else {
            Mode::Playcount
        }
    }

    /// Theme used until the user toggles one into the preference store.
    pub fn default_theme(&self) -> Theme {
        if self.ui.dark_mode.unwrap_or(true) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => sesh_db::default_db_path(),
        }
    }

    pub fn log_level(&self) -> String {
        self.logging
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_ascii_lowercase()
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.logging.file {
            Some(file) => Ok(PathBuf::from(file)),
            None => Ok(sesh_db::data_dir()?.join("sesh.log")),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# sesh config\n# Place this file at: {}\n\nversion = 1\n\n[history]\n# Directory holding the exported Streaming_History*.json files\ninput_dir = \"{}\"\n# Plays at or below this many milliseconds are not counted\nmin_milliseconds = {}\n\n[ui]\nitems_per_page = {}\nplaytime_mode = false\ndark_mode = true\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/sesh/sesh.db)\n# db_path = \"/absolute/path/to/sesh.db\"\n\n[logging]\n# RUST_LOG overrides this level\nlevel = \"{}\"\n# file = \"/absolute/path/to/sesh.log\"\n",
            path.display(),
            DEFAULT_INPUT_DIR,
            DEFAULT_MIN_MILLISECONDS,
            DEFAULT_ITEMS_PER_PAGE,
            DEFAULT_LOG_LEVEL,
        )
    }
}
