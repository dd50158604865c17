use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use log::info;

use super::store::JsonLabelStore;

const SNAPSHOT_FILE: &str = "labels.json";

/// Maps an operator name to their own folder under the results root.
#[derive(Debug, Clone)]
pub struct DirectoryIdentity {
    root: PathBuf,
}

impl DirectoryIdentity {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            info!("Creating results folder {}", root.display());
        }
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create results folder {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Label store for `user`, creating their folder on first use.
    pub fn resolve(&self, user: &str) -> Result<JsonLabelStore> {
        let user = user.trim();
        if user.is_empty() {
            bail!("user name must not be empty");
        }
        if user.contains(['/', '\\']) || user == "." || user == ".." {
            bail!("user name '{user}' cannot be used as a folder name");
        }

        let folder = self.root.join(user);
        fs::create_dir_all(&folder)
            .with_context(|| format!("failed to create user folder {}", folder.display()))?;
        Ok(JsonLabelStore::new(folder.join(SNAPSHOT_FILE)))
    }
}
