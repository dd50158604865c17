use log::{info, warn};
use serde::Serialize;

use crate::{
    catalog::{Catalog, LightCurveRecord, SeriesSource},
    folding::{
        fold, magnitude_range, page_caption, slot_title, DisplayRange, FoldKind, FoldedSeries,
    },
    labels::{restore_labels, ClassSet, LabelStore},
    settings::LabelerSettings,
};

use super::state::{Cursor, Effect, Event, LabelingState};

/// What a single grid slot currently shows.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SlotContent {
    /// Past the end of the catalog.
    Empty,
    Folded {
        series: FoldedSeries,
        /// Per point: folded at the period or at twice the period.
        #[serde(rename = "foldKind")]
        fold_kind: Vec<FoldKind>,
        #[serde(rename = "errorLow")]
        error_low: Vec<f64>,
        #[serde(rename = "errorHigh")]
        error_high: Vec<f64>,
        range: Option<DisplayRange>,
    },
    /// The light curve could not be loaded or folded.
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub slot: usize,
    pub record: Option<LightCurveRecord>,
    pub title: String,
    pub label: Option<String>,
    pub content: SlotContent,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub caption: String,
    pub cursor: Cursor,
    pub page_count: usize,
    pub labeled: usize,
    pub total: usize,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum CheckpointOutcome {
    Saved { location: String },
    /// Labels stay in memory; only durability was lost.
    Failed { reason: String },
}

/// Result of handling one event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub view: PageView,
    pub checkpoint: Option<CheckpointOutcome>,
}

/// Owns the session state and carries out the effects it asks for.
pub struct LabelingController {
    catalog: Catalog,
    source: Box<dyn SeriesSource>,
    store: Box<dyn LabelStore>,
    classes: ClassSet,
    state: LabelingState,
    /// Folded content for the slots of the current page.
    contents: Vec<SlotContent>,
}

impl LabelingController {
    pub fn new(
        catalog: Catalog,
        source: Box<dyn SeriesSource>,
        store: Box<dyn LabelStore>,
        settings: &LabelerSettings,
    ) -> Self {
        let classes = settings.classes.clone();
        let labels = restore_labels(store.as_ref(), catalog.len(), &classes);
        let state = LabelingState::new(settings.grid.page_size(), labels, settings.checkpoint);

        let mut controller = Self {
            catalog,
            source,
            store,
            classes,
            state,
            contents: Vec::new(),
        };
        controller.refresh_page();
        controller
    }

    pub fn handle(&mut self, event: Event) -> Update {
        let mut checkpoint = None;
        for effect in self.state.apply(event) {
            match effect {
                Effect::RefreshPage => self.refresh_page(),
                // Titles and the cursor marker are rebuilt with every view.
                Effect::RefreshSlot(_) | Effect::MoveCursor => {}
                Effect::Checkpoint => checkpoint = Some(self.checkpoint()),
            }
        }

        Update {
            view: self.view(),
            checkpoint,
        }
    }

    /// Final checkpoint before the session ends, whatever the policy says.
    pub fn finish(&mut self) -> CheckpointOutcome {
        self.state.apply(Event::Save);
        self.checkpoint()
    }

    pub fn state(&self) -> &LabelingState {
        &self.state
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    /// Records visible on the current page, in slot order.
    pub fn current_page_records(&self) -> &[LightCurveRecord] {
        &self.catalog.records()[self.state.page_records()]
    }

    pub fn view(&self) -> PageView {
        let state = &self.state;
        let records = self.current_page_records();

        let slots = (0..state.page_size())
            .map(|slot| {
                let content = self.contents.get(slot).cloned().unwrap_or(SlotContent::Empty);
                match records.get(slot) {
                    Some(record) => {
                        let label = state
                            .labels()
                            .get(record.id)
                            .map(|class| self.classes.name(class).to_string());
                        SlotView {
                            slot,
                            record: Some(record.clone()),
                            title: slot_title(
                                record.id,
                                &record.source_file,
                                record.period,
                                label.as_deref(),
                            ),
                            label,
                            content,
                        }
                    }
                    None => SlotView {
                        slot,
                        record: None,
                        title: String::new(),
                        label: None,
                        content: SlotContent::Empty,
                    },
                }
            })
            .collect();

        PageView {
            caption: page_caption(state.cursor().page_index, state.page_count()),
            cursor: state.cursor(),
            page_count: state.page_count(),
            labeled: state.labels().labeled_count(),
            total: state.catalog_len(),
            slots,
        }
    }

    fn refresh_page(&mut self) {
        let contents = self
            .current_page_records()
            .iter()
            .map(|record| self.fold_record(record))
            .collect();
        self.contents = contents;
    }

    fn fold_record(&self, record: &LightCurveRecord) -> SlotContent {
        let folded = self
            .source
            .resolve(record)
            .and_then(|raw| fold(&raw, record.period));

        match folded {
            Ok(series) => {
                let fold_kind = (0..series.len()).map(|i| series.fold_kind(i)).collect();
                let (error_low, error_high) =
                    (0..series.len()).map(|i| series.error_bar(i)).unzip();
                SlotContent::Folded {
                    range: magnitude_range(&series),
                    fold_kind,
                    error_low,
                    error_high,
                    series,
                }
            }
            Err(err) => {
                warn!(
                    "Cannot show light curve {} ({}): {err}",
                    record.id, record.source_file
                );
                SlotContent::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn checkpoint(&self) -> CheckpointOutcome {
        let location = self.store.describe();
        match self.store.save(self.state.labels(), &self.classes) {
            Ok(()) => {
                info!("Saving labels at {location}");
                CheckpointOutcome::Saved { location }
            }
            Err(err) => {
                warn!("Failed to save labels at {location}: {err}");
                CheckpointOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
