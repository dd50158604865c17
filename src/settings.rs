use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, num::NonZeroUsize, path::Path, str::FromStr};

use crate::labels::ClassSet;

/// Largest number of plots a page may hold.
pub const MAX_PAGE_SIZE: usize = 64;

/// When the label array is written to disk on its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum CheckpointPolicy {
    /// Save each time labeling fills a page and moves on to the next one.
    PageBoundary,
    EveryLabel,
    /// Save after this many labels since the previous save.
    EveryN { count: NonZeroUsize },
}

impl Default for CheckpointPolicy {
    fn default() -> Self {
        CheckpointPolicy::PageBoundary
    }
}

impl FromStr for CheckpointPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "page" => Ok(CheckpointPolicy::PageBoundary),
            "label" => Ok(CheckpointPolicy::EveryLabel),
            other => {
                let count = other
                    .strip_prefix("every:")
                    .and_then(|n| n.parse::<NonZeroUsize>().ok())
                    .ok_or_else(|| {
                        format!("unknown checkpoint policy '{other}' (use page, label or every:N)")
                    })?;
                Ok(CheckpointPolicy::EveryN { count })
            }
        }
    }
}

impl fmt::Display for CheckpointPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointPolicy::PageBoundary => write!(f, "page"),
            CheckpointPolicy::EveryLabel => write!(f, "label"),
            CheckpointPolicy::EveryN { count } => write!(f, "every:{count}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridSettings {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self { rows: 3, cols: 3 }
    }
}

impl GridSettings {
    pub fn page_size(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabelerSettings {
    pub grid: GridSettings,
    pub checkpoint: CheckpointPolicy,
    pub classes: ClassSet,
}

impl LabelerSettings {
    /// Read settings from `path`. A missing file is created with the
    /// defaults; an unreadable or malformed one is logged and replaced by
    /// the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.persist(path)?;
            info!("Wrote default settings to {}", path.display());
            return Ok(settings);
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("Cannot read settings from {}: {err}", path.display());
                return Ok(Self::default());
            }
        };
        match serde_json::from_str::<Self>(&contents) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!("Ignoring settings in {}: {err}", path.display());
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            bail!(
                "grid must have at least one row and column, got {}x{}",
                self.grid.rows,
                self.grid.cols
            );
        }
        match self.grid.rows.checked_mul(self.grid.cols) {
            Some(size) if size <= MAX_PAGE_SIZE => {}
            _ => bail!(
                "grid {}x{} holds more than {MAX_PAGE_SIZE} plots",
                self.grid.rows,
                self.grid.cols
            ),
        }
        // Deserialization bypasses ClassSet::new, so check again here.
        ClassSet::new(self.classes.names().to_vec()).map_err(anyhow::Error::msg)?;
        Ok(())
    }

    fn persist(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
