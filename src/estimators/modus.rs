//! Mode estimation via shortest-interval search.
//!
//! The mode of a continuous-valued sample is approximated without binning:
//! sort the samples, slide a window of length `⌈√n⌉` across the sorted
//! sequence, pick the placement with the smallest span (the densest
//! cluster), and average the window's central third. On terraced rows this
//! locks onto the majority terrace where mean and median would land between
//! terraces.

use crate::field::Field;
use crate::mask::MaskingPolicy;
use crate::parallel::{map_rows, ParallelOptions};
use crate::stats::median_in_place;

/// Sample count below which the row median is used directly.
const MIN_SAMPLES_FOR_WINDOW: usize = 9;

/// Shortest-window mode of an already sorted, non-empty slice.
fn shortest_window_mode(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    let w = (n as f64).sqrt().ceil() as usize;
    let w = w.clamp(1, n);

    let mut best_pos = 0usize;
    let mut best_span = f64::INFINITY;
    for p in 0..=n - w {
        let span = sorted[p + w - 1] - sorted[p];
        if span < best_span {
            best_span = span;
            best_pos = p;
        }
    }

    // Average the central third of the densest window.
    let skip = w / 3;
    let lo = best_pos + skip;
    let hi = best_pos + w - skip;
    let kept = &sorted[lo..hi];
    kept.iter().sum::<f64>() / kept.len() as f64
}

/// Per-row mode levels; `None` marks rows without usable samples.
pub(crate) fn row_levels(
    field: &Field,
    mask: Option<&Field>,
    policy: MaskingPolicy,
    par: ParallelOptions,
) -> Vec<Option<f64>> {
    map_rows(field.yres, par, |y| {
        let mut values = super::admitted_values(field, mask, policy, y);
        if values.len() < MIN_SAMPLES_FOR_WINDOW {
            return median_in_place(&mut values);
        }
        values.sort_unstable_by(f64::total_cmp);
        Some(shortest_window_mode(&values))
    })
}
