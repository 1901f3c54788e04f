//! Parameter types configuring an alignment call.

use serde::{Deserialize, Serialize};

use crate::estimators::AlignMethod;
use crate::mask::MaskingPolicy;
use crate::parallel::ParallelOptions;

/// Whether correction is computed per horizontal row or per vertical column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// One correction per horizontal row.
    #[default]
    Rows,
    /// One correction per vertical column (the grid is transposed
    /// internally and transposed back after application).
    Columns,
}

/// Parameters controlling one alignment call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignParams {
    /// Estimator used to derive the per-row correction.
    pub method: AlignMethod,
    /// Row-wise or column-wise operation.
    pub direction: Direction,
    /// How mask values gate sample participation. Resolved to `Ignore`
    /// when no mask is supplied.
    pub masking: MaskingPolicy,
    /// Fraction of extreme sorted samples discarded by the trimmed family,
    /// in `[0, 0.5]`. Ignored by the median methods, which pin it to 0.5.
    pub trim_fraction: f64,
    /// Polynomial degree for [`AlignMethod::Polynomial`].
    pub degree: usize,
    /// Runtime control over row-parallel execution.
    pub parallel: ParallelOptions,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            method: AlignMethod::Median,
            direction: Direction::Rows,
            masking: MaskingPolicy::Ignore,
            trim_fraction: 0.05,
            degree: 1,
            parallel: ParallelOptions::default(),
        }
    }
}
