use crate::error::{LabelerError, LabelerResult};

use super::classes::{ClassId, ClassSet};

/// Value written for a record nobody has labeled yet.
pub const UNLABELED: i64 = -1;

/// One optional class per catalog record, addressed by record index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelArray {
    values: Vec<Option<ClassId>>,
}

impl LabelArray {
    pub fn unlabeled(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    /// Rebuild from a flat snapshot where `-1` means unlabeled.
    pub fn from_raw(raw: &[i64], expected_len: usize, classes: &ClassSet) -> LabelerResult<Self> {
        if raw.len() != expected_len {
            return Err(LabelerError::CorruptSnapshot(format!(
                "holds {} labels but the catalog has {expected_len} records",
                raw.len()
            )));
        }

        let values = raw
            .iter()
            .enumerate()
            .map(|(index, &value)| match value {
                UNLABELED => Ok(None),
                value => usize::try_from(value)
                    .ok()
                    .and_then(|class| classes.class(class))
                    .map(Some)
                    .ok_or_else(|| {
                        LabelerError::CorruptSnapshot(format!(
                            "label {value} at index {index} is outside -1..{}",
                            classes.len()
                        ))
                    }),
            })
            .collect::<LabelerResult<Vec<_>>>()?;

        Ok(Self { values })
    }

    pub fn to_raw(&self) -> Vec<i64> {
        self.values
            .iter()
            .map(|value| value.map_or(UNLABELED, |class| class.index() as i64))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ClassId> {
        self.values.get(index).copied().flatten()
    }

    pub(crate) fn set(&mut self, index: usize, class: ClassId) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = Some(class);
        }
    }

    pub fn first_unlabeled(&self) -> Option<usize> {
        self.values.iter().position(Option::is_none)
    }

    pub fn labeled_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }
}
