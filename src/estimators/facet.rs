//! Iterative robust removal of per-row linear tilt.
//!
//! Each row is fitted with a slope through an M-estimator: per-pixel slopes
//! vote with weights `exp(-vx²/σ²)` where σ² is pinned well below the mean
//! squared slope, so the fit locks onto the dominant facet and topographic
//! steps barely vote. The fitted tilt is subtracted and the fit repeated
//! until the residual slope falls below `1e-6 / dx` or the iteration budget
//! runs out.
//!
//! The method has no single scalar shift per row; the grid is corrected in
//! place and the aligner reports an all-zero shift curve for it.

use log::debug;

use crate::field::Field;
use crate::mask::{MaskingPolicy, RowGate};
use crate::parallel::{map_rows_mut, ParallelOptions};

/// Iteration budget per row.
const MAX_ITERATIONS: usize = 30;

/// Scale factor tying σ² to the mean squared slope.
const SIGMA_FACTOR: f64 = 1.0 / 200.0;

/// Per-row outcome counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FacetReport {
    /// Rows left untouched for lack of usable samples.
    pub skipped: usize,
    /// Rows that exhausted the iteration budget without converging.
    pub unconverged: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowOutcome {
    Leveled,
    Skipped,
    Unconverged,
}

/// Robust slope of `row` over pairs admitted by the gate; `None` when no
/// pair participates or the weights collapse numerically.
fn robust_slope(row: &[f64], gate: &RowGate<'_>, dx: f64) -> Option<f64> {
    let mut slopes = Vec::with_capacity(row.len().saturating_sub(1));
    for j in 0..row.len().saturating_sub(1) {
        if gate.admits(j) && gate.admits(j + 1) {
            slopes.push((row[j + 1] - row[j]) / dx);
        }
    }
    if slopes.is_empty() {
        return None;
    }

    let msq = slopes.iter().map(|v| v * v).sum::<f64>() / slopes.len() as f64;
    if msq == 0.0 {
        return Some(0.0);
    }
    let sigma2 = SIGMA_FACTOR * msq;

    let mut sw = 0.0;
    let mut swv = 0.0;
    for &v in &slopes {
        let w = (-v * v / sigma2).exp();
        sw += w;
        swv += w * v;
    }
    if sw <= 0.0 || !sw.is_finite() {
        return None;
    }
    let slope = swv / sw;
    slope.is_finite().then_some(slope)
}

fn level_row(row: &mut [f64], gate: &RowGate<'_>, dx: f64, min_samples: usize) -> RowOutcome {
    let usable = (0..row.len()).filter(|&j| gate.admits(j)).count();
    if usable < min_samples {
        return RowOutcome::Skipped;
    }

    let centre = 0.5 * (row.len() as f64 - 1.0);
    let threshold = 1e-6 / dx;
    for _ in 0..MAX_ITERATIONS {
        let Some(bx) = robust_slope(row, gate, dx) else {
            return RowOutcome::Skipped;
        };
        // The gate only selects which slopes vote; the tilt comes off the
        // whole row so masked samples stay consistent with their neighbours.
        for (j, v) in row.iter_mut().enumerate() {
            *v -= bx * dx * (j as f64 - centre);
        }
        if bx.abs() < threshold {
            return RowOutcome::Leveled;
        }
    }
    RowOutcome::Unconverged
}

/// Remove per-row tilt in place; returns outcome counters.
pub(crate) fn level_rows(
    field: &mut Field,
    mask: Option<&Field>,
    policy: MaskingPolicy,
    par: ParallelOptions,
) -> FacetReport {
    let xres = field.xres;
    let dx = field.dx;
    let min_samples = ((xres as f64).ln() + 1.0).ceil() as usize;

    let outcomes = map_rows_mut(&mut field.data, xres, par, |y, row| {
        let gate = RowGate::new(mask, policy, y);
        level_row(row, &gate, dx, min_samples)
    });

    let mut report = FacetReport::default();
    for (y, outcome) in outcomes.iter().enumerate() {
        match outcome {
            RowOutcome::Leveled => {}
            RowOutcome::Skipped => report.skipped += 1,
            RowOutcome::Unconverged => {
                debug!("facet: row {y} did not converge within {MAX_ITERATIONS} iterations");
                report.unconverged += 1;
            }
        }
    }
    report
}
