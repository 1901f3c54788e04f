//! Pairwise row matching with outlier down-weighting.
//!
//! For each pair of consecutive rows the local disagreement in slope
//! `x_j = a[j+1] - a[j] - b[j+1] + b[j]` is invariant under a constant
//! row offset, so large `|x_j|` flags genuine topography rather than drift.
//! Columns are down-weighted by `exp(-x²/(2σ²))` with σ² derived from the
//! mean absolute disagreement, and the remaining weighted least-squares
//! offset is accumulated into an absolute shift curve anchored at row 0.

use log::debug;

use crate::field::Field;
use crate::mask::{MaskingPolicy, RowGate};
use crate::parallel::{map_rows, ParallelOptions};

/// Gaussian-consistent variance from a mean absolute deviation.
const MAD_TO_VARIANCE: f64 = std::f64::consts::PI / 2.0;

/// Weighted offset of row `a` over row `b`; `None` when the pair has no
/// usable weight.
fn pair_offset(a: &[f64], b: &[f64], gate_a: &RowGate<'_>, gate_b: &RowGate<'_>) -> Option<f64> {
    let xres = a.len();
    let mut slope_diff = vec![None; xres.saturating_sub(1)];
    let mut abs_sum = 0.0;
    let mut abs_n = 0usize;
    for j in 0..xres.saturating_sub(1) {
        let usable = gate_a.admits(j)
            && gate_a.admits(j + 1)
            && gate_b.admits(j)
            && gate_b.admits(j + 1);
        if usable {
            let x = a[j + 1] - a[j] - b[j + 1] + b[j];
            slope_diff[j] = Some(x);
            abs_sum += x.abs();
            abs_n += 1;
        }
    }

    let variance = if abs_n > 0 {
        let mad = abs_sum / abs_n as f64;
        MAD_TO_VARIANCE * mad * mad
    } else {
        0.0
    };

    let weights: Vec<f64> = slope_diff
        .iter()
        .map(|x| match x {
            // Rows that already match perfectly leave the scale at zero;
            // uniform weights recover the plain mean offset.
            Some(x) if variance > 0.0 => (-x * x / (2.0 * variance)).exp(),
            Some(_) => 1.0,
            None => 0.0,
        })
        .collect();

    // Trapezoidal sum: the weight of each column pair supports both of its
    // endpoint columns.
    let mut num = 0.0;
    let mut den = 0.0;
    for j in 0..xres {
        if !(gate_a.admits(j) && gate_b.admits(j)) {
            continue;
        }
        let wl = if j > 0 { weights[j - 1] } else { 0.0 };
        let wr = if j < xres - 1 { weights[j] } else { 0.0 };
        let w = wl + wr;
        if w > 0.0 {
            num += (a[j] - b[j]) * w;
            den += w;
        }
    }

    if den > 0.0 {
        Some(num / den)
    } else {
        None
    }
}

/// Per-pair offset increments; entry 0 anchors the accumulation at 0 and
/// `None` marks pairs with zero total weight.
pub(crate) fn pair_increments(
    field: &Field,
    mask: Option<&Field>,
    policy: MaskingPolicy,
    par: ParallelOptions,
) -> Vec<Option<f64>> {
    map_rows(field.yres, par, |y| {
        if y == 0 {
            return Some(0.0);
        }
        let gate_a = RowGate::new(mask, policy, y);
        let gate_b = RowGate::new(mask, policy, y - 1);
        let offset = pair_offset(field.row(y), field.row(y - 1), &gate_a, &gate_b);
        if offset.is_none() {
            debug!("match: rows {}..{} share no usable weight, keeping previous shift", y - 1, y);
        }
        offset
    })
}
