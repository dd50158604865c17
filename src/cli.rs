use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::settings::{CheckpointPolicy, LabelerSettings};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Parser, Debug)]
#[command(name = "lc-labeler")]
#[command(author, version, about = "Inspect folded light curves and label them")]
pub struct Cli {
    /// Directory holding the light curve files named in the catalog
    pub raw_dir: PathBuf,

    /// JSON catalog with parallel `files` and `periods` lists
    pub catalog: PathBuf,

    /// Folder where per-user label snapshots are kept
    pub results_root: PathBuf,

    /// Optional JSON list of catalog indices to label instead of the full catalog
    pub subset: Option<PathBuf>,

    /// Operator name; labels are stored under RESULTS_ROOT/<user>/
    #[arg(long, short, env = "LC_LABELER_USER")]
    pub user: String,

    /// Grid rows per page
    #[arg(long)]
    pub rows: Option<usize>,

    /// Grid columns per page
    #[arg(long)]
    pub cols: Option<usize>,

    /// When to save automatically: page, label or every:N
    #[arg(long)]
    pub checkpoint: Option<CheckpointPolicy>,

    /// Settings file (defaults to RESULTS_ROOT/settings.json)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn settings_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.results_root.join(SETTINGS_FILE))
    }

    /// Settings file values with command line flags layered on top.
    pub fn settings(&self) -> Result<LabelerSettings> {
        let mut settings = LabelerSettings::load(&self.settings_path())?;
        if let Some(rows) = self.rows {
            settings.grid.rows = rows;
        }
        if let Some(cols) = self.cols {
            settings.grid.cols = cols;
        }
        if let Some(policy) = self.checkpoint {
            settings.checkpoint = policy;
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn check_inputs(&self) -> Result<()> {
        if !self.raw_dir.is_dir() {
            bail!("light curve directory {} does not exist", self.raw_dir.display());
        }
        if !self.catalog.is_file() {
            bail!("catalog {} does not exist", self.catalog.display());
        }
        if let Some(subset) = &self.subset {
            if !subset.is_file() {
                bail!("subset index {} does not exist", subset.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_paths_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "lc-labeler",
            "curves",
            "catalog.json",
            root,
            "--user",
            "vera",
            "--rows",
            "2",
            "--checkpoint",
            "every:4",
        ])
        .unwrap();

        assert!(cli.subset.is_none());
        assert_eq!(cli.settings_path(), dir.path().join("settings.json"));

        let settings = cli.settings().unwrap();
        assert_eq!(settings.grid.rows, 2);
        assert_eq!(settings.grid.cols, 3);
        assert_eq!(settings.checkpoint.to_string(), "every:4");
    }

    #[test]
    fn missing_required_paths_fail_to_parse() {
        assert!(Cli::try_parse_from(["lc-labeler", "curves", "--user", "vera"]).is_err());
    }

    #[test]
    fn zero_columns_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli =
            Cli::try_parse_from(["lc-labeler", "a", "b", root, "-u", "vera", "--cols", "0"])
                .unwrap();
        assert!(cli.settings().is_err());
    }

    #[test]
    fn absent_inputs_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["lc-labeler", "nowhere", "none.json", root, "-u", "v"])
            .unwrap();
        assert!(cli.check_inputs().is_err());
    }
}
