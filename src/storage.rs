//! On-disk draft of the workout in progress, one JSON file per user.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::session::ActiveWorkout;

#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, user: &str) -> PathBuf {
        let file: String = user
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }

    pub fn load(&self, user: &str) -> Result<Option<ActiveWorkout>> {
        let path = self.path(user);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read workout draft: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let workout = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse workout draft: {}", path.display()))?;
        Ok(Some(workout))
    }

    pub fn save(&self, user: &str, workout: &ActiveWorkout) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;
        let path = self.path(user);
        let content = serde_json::to_string_pretty(workout)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to save workout draft to {}", path.display()))?;
        debug!(path = %path.display(), "saved workout draft");
        Ok(())
    }

    /// Returns whether a draft existed.
    pub fn clear(&self, user: &str) -> Result<bool> {
        let path = self.path(user);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove workout draft: {}", path.display()))?;
        Ok(true)
    }

    /// Drop the draft once its workout is stored. A draft that cannot be
    /// removed is emptied so it can never be finished a second time.
    pub fn settle(&self, user: &str) -> bool {
        match self.clear(user) {
            Ok(_) => true,
            Err(err) => {
                warn!(user, error = %err, "could not remove saved workout draft");
                let path = self.path(user);
                if path.is_file() {
                    if let Err(err) = fs::write(&path, "") {
                        warn!(path = %path.display(), error = %err, "could not empty workout draft");
                    }
                }
                false
            }
        }
    }
}
