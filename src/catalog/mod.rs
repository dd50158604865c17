pub mod raw_series;
pub mod records;

pub use raw_series::{DirectorySource, RawSeries, SeriesSource};
pub use records::{Catalog, LightCurveRecord};
