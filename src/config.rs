//! Flat key/value settings stored as TOML in the user's config directory.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metrics::ProgressionRules;

pub const APP_DIR: &str = "ironlog";

pub const KEY_USER: &str = "user";
pub const KEY_DB_PATH: &str = "db_path";
pub const KEY_HEAVY_LIFTS: &str = "heavy_lifts";
pub const KEY_HEAVY_INCREMENT: &str = "heavy_increment";
pub const KEY_DEFAULT_INCREMENT: &str = "default_increment";

pub const KNOWN_KEYS: [&str; 5] = [
    KEY_USER,
    KEY_DB_PATH,
    KEY_HEAVY_LIFTS,
    KEY_HEAVY_INCREMENT,
    KEY_DEFAULT_INCREMENT,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub map: BTreeMap<String, String>,
}

pub fn config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR).join("config"))
        .context("Could not determine config directory")
}

pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .context("Could not determine data directory")
}

impl Config {
    /// A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let raw = toml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, raw).with_context(|| format!("Failed to save config to {}", path.display()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
    }

    pub fn user(&self) -> Option<String> {
        self.get(KEY_USER).map(|u| u.trim().to_string())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match self.get(KEY_DB_PATH) {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(data_dir()?.join("ironlog.db")),
        }
    }

    /// Increment rules with config overrides. Bad numbers keep the defaults.
    pub fn progression_rules(&self) -> ProgressionRules {
        let mut rules = ProgressionRules::default();

        if let Some(lifts) = self.get(KEY_HEAVY_LIFTS) {
            rules.heavy_lifts = lifts
                .split(',')
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect();
        }
        if let Some(v) = self.increment(KEY_HEAVY_INCREMENT) {
            rules.heavy_increment = v;
        }
        if let Some(v) = self.increment(KEY_DEFAULT_INCREMENT) {
            rules.default_increment = v;
        }
        rules
    }

    fn increment(&self, key: &str) -> Option<f64> {
        let raw = self.get(key)?;
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
            _ => {
                warn!(key, value = raw, "ignoring invalid increment");
                None
            }
        }
    }
}
