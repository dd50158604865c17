use std::cmp::Ordering;

use serde::Serialize;

use crate::catalog::RawSeries;
use crate::error::{LabelerError, LabelerResult};

/// Which period a folded point was produced with.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FoldKind {
    /// Folded at the reported period (bands 0 and 1).
    Period,
    /// Folded at twice the reported period (bands 2 and 3).
    DoublePeriod,
}

/// A light curve folded at its period and at twice its period.
///
/// Holds four bands of `len(raw)` samples each, laid out back to back:
/// `[0,1)`, `[1,2)` (copy of band 0), `[2,3)` and `[3,4)` (copy of band 2).
/// Phases ascend within each band.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoldedSeries {
    pub phase: Vec<f64>,
    pub magnitude: Vec<f64>,
    pub error: Vec<f64>,
}

impl FoldedSeries {
    pub fn len(&self) -> usize {
        self.phase.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phase.is_empty()
    }

    /// Number of samples in each band.
    pub fn band_len(&self) -> usize {
        self.phase.len() / 4
    }

    /// Band the point at `index` belongs to (0..=3).
    pub fn band_of(&self, index: usize) -> usize {
        index / self.band_len().max(1)
    }

    pub fn fold_kind(&self, index: usize) -> FoldKind {
        if self.band_of(index) < 2 {
            FoldKind::Period
        } else {
            FoldKind::DoublePeriod
        }
    }

    /// Vertical error bar `(mag - err, mag + err)` for the point at `index`.
    pub fn error_bar(&self, index: usize) -> (f64, f64) {
        let mag = self.magnitude[index];
        let err = self.error[index];
        (mag - err, mag + err)
    }
}

/// Fold `raw` at `period` and at `2 * period`.
pub fn fold(raw: &RawSeries, period: f64) -> LabelerResult<FoldedSeries> {
    if !period.is_finite() || period <= 0.0 {
        return Err(LabelerError::InvalidPeriod { period });
    }

    let n = raw.len();
    if n == 0 {
        return Ok(FoldedSeries::default());
    }

    let single = SortedFold::new(raw, period);
    let double = SortedFold::new(raw, 2.0 * period);

    let mut out = FoldedSeries {
        phase: Vec::with_capacity(4 * n),
        magnitude: Vec::with_capacity(4 * n),
        error: Vec::with_capacity(4 * n),
    };
    single.append_band(raw, 0.0, &mut out);
    single.append_band(raw, 1.0, &mut out);
    double.append_band(raw, 2.0, &mut out);
    double.append_band(raw, 3.0, &mut out);
    Ok(out)
}

/// Phases for one period plus the stable ascending order over them.
struct SortedFold {
    phase: Vec<f64>,
    order: Vec<usize>,
}

impl SortedFold {
    fn new(raw: &RawSeries, period: f64) -> Self {
        let phase: Vec<f64> = raw.time.iter().map(|&t| phase_of(t, period)).collect();
        let mut order: Vec<usize> = (0..phase.len()).collect();
        // `sort_by` is stable: equal phases keep their file order.
        order.sort_by(|&a, &b| phase[a].partial_cmp(&phase[b]).unwrap_or(Ordering::Equal));
        Self { phase, order }
    }

    fn append_band(&self, raw: &RawSeries, offset: f64, out: &mut FoldedSeries) {
        for &i in &self.order {
            out.phase.push(self.phase[i] + offset);
            out.magnitude.push(raw.magnitude[i]);
            out.error.push(raw.error[i]);
        }
    }
}

fn phase_of(time: f64, period: f64) -> f64 {
    let phase = time.rem_euclid(period) / period;
    // Tiny negative times round up to exactly one period.
    if phase >= 1.0 {
        0.0
    } else {
        phase
    }
}
