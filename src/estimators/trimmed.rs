//! Trimmed-mean estimators: per-row levels and row-pair differences.
//!
//! The trim fraction `t` discards the lowest and highest `⌊t·n⌋` sorted
//! samples before averaging. `t = 0.5` degenerates to the median: an odd
//! sample count leaves exactly the middle element, an even count leaves
//! nothing and falls back to the unconstrained mean.

use crate::field::Field;
use crate::mask::{MaskingPolicy, RowGate};
use crate::parallel::{map_rows, ParallelOptions};

/// Trimmed mean of `values`; sorts the buffer. `None` when empty.
fn trimmed_mean(values: &mut [f64], trim: f64) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);
    let cut = (trim * n as f64).floor() as usize;
    let kept = if 2 * cut < n {
        &values[cut..n - cut]
    } else {
        // Everything trimmed away (t = 0.5 with an even count).
        &values[..]
    };
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Per-row trimmed-mean levels; `None` marks rows without usable samples.
pub(crate) fn row_levels(
    field: &Field,
    mask: Option<&Field>,
    policy: MaskingPolicy,
    trim: f64,
    par: ParallelOptions,
) -> Vec<Option<f64>> {
    map_rows(field.yres, par, |y| {
        let mut values = super::admitted_values(field, mask, policy, y);
        trimmed_mean(&mut values, trim)
    })
}

/// Per-pair increments from trimmed means of vertical differences.
///
/// Entry `i` holds the trimmed mean of `row[i][j] - row[i-1][j]` over
/// columns usable in both rows; entry 0 anchors the accumulation at 0.
/// `None` marks pairs without a single common usable column.
pub(crate) fn difference_increments(
    field: &Field,
    mask: Option<&Field>,
    policy: MaskingPolicy,
    trim: f64,
    par: ParallelOptions,
) -> Vec<Option<f64>> {
    map_rows(field.yres, par, |y| {
        if y == 0 {
            return Some(0.0);
        }
        let gate_a = RowGate::new(mask, policy, y);
        let gate_b = RowGate::new(mask, policy, y - 1);
        let a = field.row(y);
        let b = field.row(y - 1);
        let mut diffs = Vec::with_capacity(a.len());
        for j in 0..a.len() {
            if gate_a.admits(j) && gate_b.admits(j) {
                diffs.push(a[j] - b[j]);
            }
        }
        trimmed_mean(&mut diffs, trim)
    })
}
