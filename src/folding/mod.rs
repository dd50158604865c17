pub mod display;
pub mod fold;

pub use display::{magnitude_range, page_caption, slot_title, DisplayRange};
pub use fold::{fold, FoldKind, FoldedSeries};
