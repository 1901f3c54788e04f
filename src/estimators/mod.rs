//! Row-statistics estimators.
//!
//! Each submodule implements one stateless estimation strategy consuming the
//! (possibly transposed) grid and producing either per-row levels, per-pair
//! increments, or per-row polynomial coefficients. The aligner selects a
//! strategy once per call from [`AlignMethod`] and owns normalization and
//! application; the estimators only ever read the grid — except facet-tilt,
//! which corrects rows in place by construction.

pub(crate) mod facet;
pub(crate) mod matching;
pub(crate) mod modus;
pub(crate) mod poly;
pub(crate) mod trimmed;

use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::mask::{MaskingPolicy, RowGate};

/// Selector for the row-alignment estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignMethod {
    /// Per-row weighted least-squares polynomial of configurable degree.
    Polynomial,
    /// Median of each row's samples.
    #[default]
    Median,
    /// Median of per-column differences between consecutive rows.
    MedianOfDifferences,
    /// Densest-cluster (shortest sorted window) approximation of the mode.
    Modus,
    /// Weighted least-squares offset between consecutive rows.
    Match,
    /// Trimmed mean of each row's samples.
    TrimmedMean,
    /// Trimmed mean of per-column differences between consecutive rows.
    TrimmedMeanOfDifferences,
    /// Iterative robust removal of per-row linear tilt.
    FacetTilt,
}

impl AlignMethod {
    /// Trim fraction actually used by the trimmed family.
    ///
    /// The median methods are the trim-0.5 special case of the trimmed
    /// estimators; for them the configured fraction is ignored.
    pub fn effective_trim(self, configured: f64) -> f64 {
        match self {
            AlignMethod::Median | AlignMethod::MedianOfDifferences => 0.5,
            _ => configured,
        }
    }

    /// Whether the method consumes the configured trim fraction.
    pub fn uses_trim_fraction(self) -> bool {
        matches!(
            self,
            AlignMethod::TrimmedMean | AlignMethod::TrimmedMeanOfDifferences
        )
    }
}

/// Samples of row `y` admitted by the gate, in column order.
pub(crate) fn admitted_values(field: &Field, mask: Option<&Field>, policy: MaskingPolicy, y: usize) -> Vec<f64> {
    let gate = RowGate::new(mask, policy, y);
    let row = field.row(y);
    let mut out = Vec::with_capacity(row.len());
    for (j, &v) in row.iter().enumerate() {
        if gate.admits(j) {
            out.push(v);
        }
    }
    out
}
