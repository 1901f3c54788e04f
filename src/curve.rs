//! Per-row shift curve with validity tracking.

use serde::Serialize;

/// One correction value per row (or column), plus a validity flag.
///
/// An invalid entry marks a row the estimator could not characterize (no
/// usable samples, singular fit). Invalid entries are pinned to 0 so the
/// corresponding rows pass through the correction untouched, and they are
/// excluded from the zero-mean normalization.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ShiftCurve {
    /// Correction value per row, 0 for invalid rows.
    pub values: Vec<f64>,
    /// Whether the estimator produced a usable value for each row.
    pub valid: Vec<bool>,
}

impl ShiftCurve {
    /// All-zero, all-valid curve of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self {
            values: vec![0.0; n],
            valid: vec![true; n],
        }
    }

    /// Build from per-row estimates; `None` marks a degenerate row.
    pub fn from_levels(levels: Vec<Option<f64>>) -> Self {
        let mut values = Vec::with_capacity(levels.len());
        let mut valid = Vec::with_capacity(levels.len());
        for level in levels {
            match level {
                Some(v) => {
                    values.push(v);
                    valid.push(true);
                }
                None => {
                    values.push(0.0);
                    valid.push(false);
                }
            }
        }
        Self { values, valid }
    }

    /// Number of rows covered by the curve.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the curve is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of rows with a usable estimate.
    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|v| **v).count()
    }

    /// Subtract the mean of the valid entries from every valid entry.
    ///
    /// Invalid entries stay at exactly 0. Returns the removed mean (0 when
    /// no entry is valid), which the aligner surfaces in its diagnostics.
    pub fn normalize_zero_mean(&mut self) -> f64 {
        let n = self.valid_count();
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .values
            .iter()
            .zip(self.valid.iter())
            .filter(|(_, ok)| **ok)
            .map(|(v, _)| *v)
            .sum();
        let mean = sum / n as f64;
        for (v, ok) in self.values.iter_mut().zip(self.valid.iter()) {
            if *ok {
                *v -= mean;
            }
        }
        mean
    }
}
