// Configuration loading and management

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const APP_DIR: &str = "todostore";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where and how tasks are persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Data file; defaults to a per-user location chosen by backend
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Persistence strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Whole collection in one JSON file, written on close
    #[default]
    Snapshot,
    /// One SQLite table, committed on every change
    Sqlite,
}

impl BackendKind {
    pub fn default_file_name(self) -> &'static str {
        match self {
            BackendKind::Snapshot => "tasks.json",
            BackendKind::Sqlite => "tasks.db",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snapshot" | "json" | "file" => Ok(BackendKind::Snapshot),
            "sqlite" | "db" | "database" => Ok(BackendKind::Sqlite),
            other => Err(format!("unknown backend: {} (expected snapshot or sqlite)", other)),
        }
    }
}

/// Rendering settings handed to the presentation layer at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub color: ColorMode,

    /// chrono format string for due dates
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::default(),
            date_format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colour only when writing to a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl StorageConfig {
    /// Configured path, or the per-user default for the backend
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| default_data_dir().join(self.backend.default_file_name()))
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))?;
        debug!(file = ?path, "Loaded configuration");
        Ok(config)
    }

    /// Load from an explicit path, or the user config file if present, or defaults
    ///
    /// Environment overrides are applied on top in every case
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `TODOSTORE_BACKEND` and `TODOSTORE_PATH` from the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("TODOSTORE_BACKEND") {
            match backend.parse() {
                Ok(kind) => self.storage.backend = kind,
                Err(e) => tracing::warn!(error = %e, "Ignoring TODOSTORE_BACKEND"),
            }
        }

        if let Some(path) = lookup("TODOSTORE_PATH").filter(|p| !p.is_empty()) {
            self.storage.path = Some(PathBuf::from(path));
        }
    }
}

/// `<config_dir>/todostore/config.yaml`, when the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.yaml"))
}

/// `<data_dir>/todostore`, falling back to the current directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}
