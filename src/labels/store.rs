use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{LabelerError, LabelerResult};

use super::{array::LabelArray, classes::ClassSet};

/// A snapshot as read back from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLabels {
    pub labels: Vec<i64>,
    /// Class names at save time. Bare-array snapshots carry none.
    pub classes: Option<Vec<String>>,
}

impl StoredLabels {
    pub fn classes_differ(&self, classes: &ClassSet) -> bool {
        self.classes
            .as_deref()
            .is_some_and(|names| names != classes.names())
    }
}

/// Durable home for a session's label array.
pub trait LabelStore: Send {
    /// The stored snapshot, or `None` when nothing has been saved yet.
    fn load_if_present(&self) -> LabelerResult<Option<StoredLabels>>;

    fn save(&self, labels: &LabelArray, classes: &ClassSet) -> LabelerResult<()>;

    /// Move a rejected snapshot out of the way so the next save cannot
    /// overwrite it. Returns the new location, if anything was moved.
    fn set_aside(&self) -> LabelerResult<Option<String>> {
        Ok(None)
    }

    /// Human readable location, used in log lines.
    fn describe(&self) -> String;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelSnapshot {
    saved_at: DateTime<Utc>,
    classes: Vec<String>,
    labels: Vec<i64>,
}

/// Snapshots are normally written with metadata, but a bare integer array
/// is accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Full(LabelSnapshot),
    Bare(Vec<i64>),
}

/// Label snapshot stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonLabelStore {
    path: PathBuf,
}

impl JsonLabelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LabelStore for JsonLabelStore {
    fn load_if_present(&self) -> LabelerResult<Option<StoredLabels>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let snapshot: SnapshotFile = serde_json::from_str(&contents)
            .map_err(|err| LabelerError::CorruptSnapshot(err.to_string()))?;
        let stored = match snapshot {
            SnapshotFile::Full(snapshot) => StoredLabels {
                labels: snapshot.labels,
                classes: Some(snapshot.classes),
            },
            SnapshotFile::Bare(labels) => StoredLabels {
                labels,
                classes: None,
            },
        };
        Ok(Some(stored))
    }

    fn save(&self, labels: &LabelArray, classes: &ClassSet) -> LabelerResult<()> {
        let snapshot = LabelSnapshot {
            saved_at: Utc::now(),
            classes: classes.names().to_vec(),
            labels: labels.to_raw(),
        };
        let serialized = serde_json::to_string_pretty(&snapshot)?;

        // Write beside the target and rename so a crash never leaves half a file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serialized)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn set_aside(&self) -> LabelerResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "labels.json".into());
        let base = format!("{name}.corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S"));
        let mut target = self.path.with_file_name(&base);
        let mut attempt = 1;
        while target.exists() {
            target = self.path.with_file_name(format!("{base}-{attempt}"));
            attempt += 1;
        }

        fs::rename(&self.path, &target)?;
        Ok(Some(target.display().to_string()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Load the stored labels, falling back to an all-unlabeled array when the
/// snapshot is missing or unusable. An unusable snapshot is set aside first.
pub fn restore_labels(store: &dyn LabelStore, len: usize, classes: &ClassSet) -> LabelArray {
    let restored = store.load_if_present().and_then(|stored| match stored {
        Some(stored) => {
            if stored.classes_differ(classes) {
                warn!(
                    "Label snapshot at {} was saved with classes {:?} but this session uses {:?}; labels are kept by index",
                    store.describe(),
                    stored.classes.as_deref().unwrap_or_default(),
                    classes.names()
                );
            }
            LabelArray::from_raw(&stored.labels, len, classes).map(Some)
        }
        None => Ok(None),
    });

    match restored {
        Ok(Some(labels)) => {
            info!(
                "Found label snapshot at {}, loaded {} of {} labels",
                store.describe(),
                labels.labeled_count(),
                len
            );
            labels
        }
        Ok(None) => LabelArray::unlabeled(len),
        Err(err) => {
            warn!(
                "Ignoring label snapshot at {}: {err}; starting unlabeled",
                store.describe()
            );
            match store.set_aside() {
                Ok(Some(moved)) => warn!("Moved rejected label snapshot to {moved}"),
                Ok(None) => {}
                Err(err) => error!(
                    "Could not move rejected label snapshot at {} aside: {err}",
                    store.describe()
                ),
            }
            LabelArray::unlabeled(len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_snapshot_starts_unlabeled() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLabelStore::new(dir.path().join("labels.json"));
        assert!(store.load_if_present().unwrap().is_none());
        assert_eq!(
            restore_labels(&store, 3, &ClassSet::default()),
            LabelArray::unlabeled(3)
        );
    }

    #[test]
    fn saved_labels_are_restored() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLabelStore::new(dir.path().join("labels.json"));
        let classes = ClassSet::default();
        let labels = LabelArray::from_raw(&[1, -1, 3], 3, &classes).unwrap();

        store.save(&labels, &classes).unwrap();
        assert!(!dir.path().join("labels.json.tmp").exists());
        assert_eq!(restore_labels(&store, 3, &classes), labels);
    }

    #[test]
    fn bare_array_snapshot_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(&path, "[0, -1]").unwrap();
        let store = JsonLabelStore::new(&path);
        assert_eq!(
            store.load_if_present().unwrap(),
            Some(StoredLabels {
                labels: vec![0, -1],
                classes: None,
            })
        );
    }

    #[test]
    fn saved_class_names_come_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLabelStore::new(dir.path().join("labels.json"));
        let classes = ClassSet::default();
        let labels = LabelArray::from_raw(&[1, -1], 2, &classes).unwrap();
        store.save(&labels, &classes).unwrap();

        let stored = store.load_if_present().unwrap().unwrap();
        assert_eq!(stored.classes.as_deref(), Some(classes.names()));
        assert!(!stored.classes_differ(&classes));

        // A renamed class set still restores by index.
        let renamed = ClassSet::new(vec!["Pulsator".into(), "Binary".into()]).unwrap();
        assert!(stored.classes_differ(&renamed));
        assert_eq!(restore_labels(&store, 2, &renamed).to_raw(), vec![1, -1]);
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_unlabeled() {
        let dir = tempfile::tempdir().unwrap();
        let classes = ClassSet::default();

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "not json").unwrap();
        let store = JsonLabelStore::new(&garbage);
        assert!(matches!(
            store.load_if_present(),
            Err(LabelerError::CorruptSnapshot(_))
        ));
        assert_eq!(restore_labels(&store, 2, &classes), LabelArray::unlabeled(2));

        let short = dir.path().join("short.json");
        fs::write(&short, "[0]").unwrap();
        let store = JsonLabelStore::new(&short);
        assert_eq!(restore_labels(&store, 2, &classes), LabelArray::unlabeled(2));

        let out_of_range = dir.path().join("range.json");
        fs::write(&out_of_range, "[0, 7]").unwrap();
        let store = JsonLabelStore::new(&out_of_range);
        assert_eq!(restore_labels(&store, 2, &classes), LabelArray::unlabeled(2));

        for path in [&garbage, &short, &out_of_range] {
            assert!(!path.exists());
        }
    }

    #[test]
    fn rejected_snapshot_is_moved_aside_before_next_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(&path, "[0, 1, 2, 3]").unwrap();
        let store = JsonLabelStore::new(&path);
        let classes = ClassSet::default();

        let labels = restore_labels(&store, 3, &classes);
        assert_eq!(labels, LabelArray::unlabeled(3));
        assert!(!path.exists());

        store.save(&labels, &classes).unwrap();
        let kept: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with("labels.json.corrupt-")
            })
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(fs::read_to_string(&kept[0]).unwrap(), "[0, 1, 2, 3]");
        assert!(path.exists());
    }

    #[test]
    fn set_aside_never_clobbers_an_earlier_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        let store = JsonLabelStore::new(&path);
        assert_eq!(store.set_aside().unwrap(), None);

        fs::write(&path, "first").unwrap();
        let first = store.set_aside().unwrap().unwrap();
        fs::write(&path, "second").unwrap();
        let second = store.set_aside().unwrap().unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&first).unwrap(), "first");
        assert_eq!(fs::read_to_string(&second).unwrap(), "second");
    }
}
