use serde::Serialize;

use super::fold::FoldedSeries;

/// Number of interquartile ranges shown on either side of the median.
const RANGE_IQR_SPAN: f64 = 3.0;

/// Vertical axis bounds for a folded light curve.
///
/// Magnitudes grow as objects get fainter, so `start` (bottom of the axis)
/// is the larger value and `end` the smaller one.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRange {
    pub start: f64,
    pub end: f64,
}

/// Median +/- 3 IQR of the folded magnitudes, inverted for display.
pub fn magnitude_range(series: &FoldedSeries) -> Option<DisplayRange> {
    if series.is_empty() {
        return None;
    }

    let mut sorted = series.magnitude.clone();
    sorted.sort_by(f64::total_cmp);

    let median = percentile(&sorted, 50.0);
    let scale = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);
    Some(DisplayRange {
        start: median + RANGE_IQR_SPAN * scale,
        end: median - RANGE_IQR_SPAN * scale,
    })
}

/// Linear-interpolated percentile over an ascending, non-empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Heading shown above a light curve slot.
pub fn slot_title(index: usize, file: &str, period: f64, class_name: Option<&str>) -> String {
    match class_name {
        Some(name) => format!("{index}) File: {file} Period: {period:.4} [days] Class: {name}"),
        None => format!("{index}) File: {file} Period: {period:.4} [days]"),
    }
}

pub fn page_caption(page_index: usize, page_count: usize) -> String {
    format!("Page {page_index} out of {page_count}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_median_plus_minus_three_iqr() {
        let series = FoldedSeries {
            phase: vec![0.0; 5],
            magnitude: vec![5.0, 1.0, 3.0, 2.0, 4.0],
            error: vec![0.0; 5],
        };
        // sorted 1..=5: median 3, q25 2, q75 4
        let range = magnitude_range(&series).unwrap();
        assert_eq!(range, DisplayRange { start: 9.0, end: -3.0 });
    }

    #[test]
    fn percentile_interpolates_between_samples() {
        assert_eq!(percentile(&[1.0, 2.0], 25.0), 1.25);
        assert_eq!(percentile(&[7.0], 75.0), 7.0);
    }

    #[test]
    fn empty_series_has_no_range() {
        assert!(magnitude_range(&FoldedSeries::default()).is_none());
    }

    #[test]
    fn titles_mention_class_only_when_labeled() {
        assert_eq!(
            slot_title(3, "lc_003.dat", 0.56789, None),
            "3) File: lc_003.dat Period: 0.5679 [days]"
        );
        assert_eq!(
            slot_title(3, "lc_003.dat", 2.0, Some("Cepheid")),
            "3) File: lc_003.dat Period: 2.0000 [days] Class: Cepheid"
        );
        assert_eq!(page_caption(1, 4), "Page 1 out of 4");
    }
}
