pub mod controller;
pub mod handle;
pub mod state;

pub use controller::{CheckpointOutcome, LabelingController, PageView, SlotContent, SlotView, Update};
pub use handle::SessionHandle;
pub use state::{Cursor, Effect, Event, LabelingState};
