use std::{fs, path::Path};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{LabelerError, LabelerResult};

/// One light curve in catalog order. `id` is its position in the
/// effective catalog (after any subset has been applied).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LightCurveRecord {
    pub id: usize,
    pub source_file: String,
    pub period: f64,
}

/// On-disk catalog: parallel lists of file names and periods.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    files: Vec<String>,
    periods: Vec<f64>,
}

/// Ordered, read-only collection of light curve records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<LightCurveRecord>,
}

impl Catalog {
    pub fn from_lists(files: Vec<String>, periods: Vec<f64>) -> LabelerResult<Self> {
        if files.len() != periods.len() {
            return Err(LabelerError::SchemaMismatch {
                files: files.len(),
                periods: periods.len(),
            });
        }

        let records = files
            .into_iter()
            .zip(periods)
            .enumerate()
            .map(|(id, (source_file, period))| {
                if !(period.is_finite() && period > 0.0) {
                    warn!("Record {id} ({source_file}) has non-positive period {period}");
                }
                LightCurveRecord {
                    id,
                    source_file,
                    period,
                }
            })
            .collect();

        Ok(Self { records })
    }

    /// Load the catalog file, narrowing it to `subset` when one is given.
    pub fn load(catalog_path: &Path, subset_path: Option<&Path>) -> LabelerResult<Self> {
        let contents = fs::read_to_string(catalog_path)?;
        let file: CatalogFile = serde_json::from_str(&contents)?;
        let mut catalog = Self::from_lists(file.files, file.periods)?;
        info!(
            "Loaded {} light curves from {}",
            catalog.len(),
            catalog_path.display()
        );

        if let Some(subset_path) = subset_path {
            let contents = fs::read_to_string(subset_path)?;
            let indices: Vec<usize> = serde_json::from_str(&contents)?;
            catalog = catalog.select(&indices)?;
            info!(
                "Applied subset {} ({} light curves)",
                subset_path.display(),
                catalog.len()
            );
        }

        Ok(catalog)
    }

    /// Keep only the records at `indices`, in the given order, renumbered
    /// from zero.
    pub fn select(&self, indices: &[usize]) -> LabelerResult<Self> {
        let records = indices
            .iter()
            .enumerate()
            .map(|(id, &index)| {
                let record = self.records.get(index).ok_or(LabelerError::IndexOutOfRange {
                    index,
                    len: self.records.len(),
                })?;
                Ok(LightCurveRecord {
                    id,
                    source_file: record.source_file.clone(),
                    period: record.period,
                })
            })
            .collect::<LabelerResult<Vec<_>>>()?;

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LightCurveRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[LightCurveRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("lc_{i}.dat")).collect()
    }

    #[test]
    fn mismatched_lists_are_rejected() {
        let err = Catalog::from_lists(names(3), vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            LabelerError::SchemaMismatch {
                files: 3,
                periods: 2
            }
        ));
    }

    #[test]
    fn subset_reindexes_in_given_order() {
        let catalog = Catalog::from_lists(names(5), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let subset = catalog.select(&[4, 1]).unwrap();
        assert_eq!(subset.len(), 2);
        assert_eq!(subset.get(0).unwrap().source_file, "lc_4.dat");
        assert_eq!(subset.get(0).unwrap().id, 0);
        assert_eq!(subset.get(1).unwrap().period, 2.0);
        assert_eq!(subset.get(1).unwrap().id, 1);
    }

    #[test]
    fn subset_index_past_end_fails() {
        let catalog = Catalog::from_lists(names(2), vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            catalog.select(&[0, 2]),
            Err(LabelerError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn loads_json_catalog_with_subset() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.json");
        let subset_path = dir.path().join("subset.json");
        fs::write(
            &catalog_path,
            r#"{"files": ["a.dat", "b.dat", "c.dat"], "periods": [0.5, 1.5, 2.5]}"#,
        )
        .unwrap();
        fs::write(&subset_path, "[2, 0]").unwrap();

        let full = Catalog::load(&catalog_path, None).unwrap();
        assert_eq!(full.len(), 3);

        let narrowed = Catalog::load(&catalog_path, Some(&subset_path)).unwrap();
        let files: Vec<&str> = narrowed
            .records()
            .iter()
            .map(|r| r.source_file.as_str())
            .collect();
        assert_eq!(files, vec!["c.dat", "a.dat"]);
    }
}
