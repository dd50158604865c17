use std::ops::Range;

use serde::Serialize;

use crate::labels::{ClassId, LabelArray};
use crate::settings::CheckpointPolicy;

/// Operator actions the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    AdvancePage,
    RetreatPage,
    AssignLabel(ClassId),
    GoBackOneLabel,
    FindFirstUnlabeled,
    /// Write the labels now, regardless of the checkpoint policy.
    Save,
}

/// Work the owner of the state must carry out after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The visible page changed; its light curves must be re-folded.
    RefreshPage,
    /// The label shown in this slot changed.
    RefreshSlot(usize),
    /// The highlighted slot moved.
    MoveCursor,
    /// Persist the label array.
    Checkpoint,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub page_index: usize,
    pub slot_index: usize,
}

/// Paging cursor plus label array for one labeling session.
///
/// All mutation goes through [`LabelingState::apply`], which returns the
/// side effects the caller has to perform.
#[derive(Debug, Clone)]
pub struct LabelingState {
    page_size: usize,
    page_index: usize,
    slot_index: usize,
    labels: LabelArray,
    policy: CheckpointPolicy,
    labels_since_checkpoint: usize,
}

impl LabelingState {
    pub fn new(page_size: usize, labels: LabelArray, policy: CheckpointPolicy) -> Self {
        Self {
            page_size: page_size.max(1),
            page_index: 0,
            slot_index: 0,
            labels,
            policy,
            labels_since_checkpoint: 0,
        }
    }

    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::AdvancePage => self.advance_page(&mut effects),
            Event::RetreatPage => self.retreat_page(&mut effects),
            Event::AssignLabel(class) => self.assign_label(class, &mut effects),
            Event::GoBackOneLabel => self.go_back_one_label(&mut effects),
            Event::FindFirstUnlabeled => self.find_first_unlabeled(&mut effects),
            Event::Save => self.checkpoint(&mut effects),
        }
        effects
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            page_index: self.page_index,
            slot_index: self.slot_index,
        }
    }

    /// Absolute record index under the cursor. May point past the catalog
    /// end on a partially filled last page.
    pub fn cursor_index(&self) -> usize {
        self.page_index * self.page_size + self.slot_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn catalog_len(&self) -> usize {
        self.labels.len()
    }

    pub fn page_count(&self) -> usize {
        self.catalog_len().div_ceil(self.page_size)
    }

    /// Record indices shown on the current page, in slot order.
    pub fn page_records(&self) -> Range<usize> {
        let start = (self.page_index * self.page_size).min(self.catalog_len());
        let end = (start + self.page_size).min(self.catalog_len());
        start..end
    }

    pub fn labels(&self) -> &LabelArray {
        &self.labels
    }

    pub fn policy(&self) -> CheckpointPolicy {
        self.policy
    }

    fn advance_page(&mut self, effects: &mut Vec<Effect>) {
        let last_page = self.page_count().saturating_sub(1);
        self.page_index = (self.page_index + 1).min(last_page);
        effects.push(Effect::RefreshPage);
    }

    fn retreat_page(&mut self, effects: &mut Vec<Effect>) {
        self.page_index = self.page_index.saturating_sub(1);
        effects.push(Effect::RefreshPage);
    }

    fn assign_label(&mut self, class: ClassId, effects: &mut Vec<Effect>) {
        let index = self.cursor_index();
        if index >= self.catalog_len() {
            return;
        }

        self.labels.set(index, class);
        self.labels_since_checkpoint += 1;
        effects.push(Effect::RefreshSlot(self.slot_index));

        let mut page_filled = false;
        if index + 1 < self.catalog_len() {
            self.slot_index += 1;
            if self.slot_index == self.page_size {
                self.slot_index = 0;
                self.advance_page(effects);
                page_filled = true;
            }
            effects.push(Effect::MoveCursor);
        }

        let due = match self.policy {
            CheckpointPolicy::PageBoundary => page_filled,
            CheckpointPolicy::EveryLabel => true,
            CheckpointPolicy::EveryN { count } => self.labels_since_checkpoint >= count.get(),
        };
        if due {
            self.checkpoint(effects);
        }
    }

    fn go_back_one_label(&mut self, effects: &mut Vec<Effect>) {
        if self.slot_index > 0 {
            self.slot_index -= 1;
        } else if self.page_index > 0 {
            self.retreat_page(effects);
            self.slot_index = self.page_size - 1;
        }
        effects.push(Effect::MoveCursor);
    }

    fn find_first_unlabeled(&mut self, effects: &mut Vec<Effect>) {
        let Some(index) = self.labels.first_unlabeled() else {
            return;
        };
        self.page_index = index / self.page_size;
        self.slot_index = index % self.page_size;
        effects.push(Effect::RefreshPage);
        effects.push(Effect::MoveCursor);
    }

    fn checkpoint(&mut self, effects: &mut Vec<Effect>) {
        self.labels_since_checkpoint = 0;
        effects.push(Effect::Checkpoint);
    }
}
