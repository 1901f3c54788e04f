//! Alignment orchestration: validation, direction handling, dispatch,
//! shift application, and background extraction.
//!
//! Overview
//! - Validates the configuration up front; nothing is touched on error.
//! - For column-wise operation, transposes the grid (and mask) into scratch
//!   buffers, runs the row path, and transposes back.
//! - Dispatches to the selected estimator, obtaining per-row levels,
//!   accumulated pair offsets, polynomial coefficients, or (for facet-tilt)
//!   an already-corrected grid.
//! - Zero-mean-normalizes the shift curve over the rows that produced a
//!   usable estimate and subtracts it; degenerate rows stay untouched.
//! - Computes the background grid as original minus corrected.
//!
//! No step after validation can fail: every per-row edge case (empty row,
//! zero-weight pair, singular fit matrix) degrades to a neutral correction
//! for that row and a counter in [`AlignDiagnostics`].

mod params;

pub use params::{AlignParams, Direction};

use serde::Serialize;

use crate::curve::ShiftCurve;
use crate::estimators::{facet, matching, modus, poly, trimmed, AlignMethod};
use crate::field::Field;
use crate::mask::MaskingPolicy;
use crate::parallel::for_each_row_mut;

/// Counters describing how an alignment call went.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AlignDiagnostics {
    /// Rows (or columns) processed.
    pub lanes: usize,
    /// Lanes left uncorrected for lack of usable samples.
    pub degenerate_lanes: usize,
    /// Polynomial fits rejected by the Cholesky decomposition.
    pub singular_fits: usize,
    /// Consecutive-lane pairs with zero total weight (match/differences).
    pub zero_weight_pairs: usize,
    /// Lanes where the facet-tilt iteration budget ran out.
    pub unconverged_lanes: usize,
    /// Mean level removed from the shift curve by normalization.
    pub mean_shift_removed: f64,
}

/// Result of one alignment call.
#[derive(Clone, Debug, Serialize)]
pub struct Alignment {
    /// Zero-mean correction per lane (all-zero for facet-tilt).
    pub shifts: ShiftCurve,
    /// Removed component: original minus corrected, same shape as input.
    pub background: Field,
    /// Per-call counters.
    pub diagnostics: AlignDiagnostics,
}

/// Row-alignment engine configured once and applied to any number of grids.
#[derive(Clone, Debug, Default)]
pub struct RowAligner {
    params: AlignParams,
}

impl RowAligner {
    /// Construct an aligner with the given parameters.
    pub fn new(params: AlignParams) -> Self {
        Self { params }
    }

    /// The parameters this aligner was built with.
    pub fn params(&self) -> &AlignParams {
        &self.params
    }

    /// Correct `field` in place and return the shift curve, the removed
    /// background, and diagnostics.
    ///
    /// Fails only on invalid configuration (trim fraction outside
    /// `[0, 0.5]`, a masking policy that requires an absent or misshapen
    /// mask, an empty grid); no row data is modified on error.
    pub fn align(&self, field: &mut Field, mask: Option<&Field>) -> Result<Alignment, String> {
        validate(field, mask, &self.params)?;
        // A missing mask behaves like Ignore even if the policy says
        // otherwise; validation has already rejected the policies that
        // genuinely need one.
        let policy = if mask.is_some() {
            self.params.masking
        } else {
            MaskingPolicy::Ignore
        };

        match self.params.direction {
            Direction::Rows => align_lanes(field, mask, policy, &self.params),
            Direction::Columns => {
                let mut work = field.transposed();
                let mask_t = mask.map(Field::transposed);
                let out = align_lanes(&mut work, mask_t.as_ref(), policy, &self.params)?;
                *field = work.transposed();
                Ok(Alignment {
                    shifts: out.shifts,
                    background: out.background.transposed(),
                    diagnostics: out.diagnostics,
                })
            }
        }
    }
}

/// One-shot convenience wrapper around [`RowAligner`].
pub fn align_rows(
    field: &mut Field,
    mask: Option<&Field>,
    params: &AlignParams,
) -> Result<Alignment, String> {
    RowAligner::new(params.clone()).align(field, mask)
}

fn validate(field: &Field, mask: Option<&Field>, params: &AlignParams) -> Result<(), String> {
    if field.xres == 0 || field.yres == 0 {
        return Err("field must have at least one row and one column".to_string());
    }
    if field.data.len() != field.xres * field.yres {
        return Err(format!(
            "field data length {} does not match {}x{}",
            field.data.len(),
            field.xres,
            field.yres
        ));
    }
    if !(0.0..=0.5).contains(&params.trim_fraction) {
        return Err(format!(
            "trim fraction {} outside [0, 0.5]",
            params.trim_fraction
        ));
    }
    if params.masking.uses_mask() {
        match mask {
            None => {
                return Err(format!(
                    "masking policy {:?} requires a mask",
                    params.masking
                ))
            }
            Some(m) if m.xres != field.xres || m.yres != field.yres => {
                return Err(format!(
                    "mask shape {}x{} does not match field {}x{}",
                    m.xres, m.yres, field.xres, field.yres
                ))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Row-direction work horse; `field` rows are the lanes being aligned.
fn align_lanes(
    field: &mut Field,
    mask: Option<&Field>,
    policy: MaskingPolicy,
    params: &AlignParams,
) -> Result<Alignment, String> {
    let mut background = field.clone();
    let mut diag = AlignDiagnostics {
        lanes: field.yres,
        ..Default::default()
    };

    let shifts = match params.method {
        AlignMethod::Median | AlignMethod::TrimmedMean => {
            let trim = params.method.effective_trim(params.trim_fraction);
            let levels = trimmed::row_levels(field, mask, policy, trim, params.parallel);
            let mut curve = ShiftCurve::from_levels(levels);
            diag.degenerate_lanes = curve.len() - curve.valid_count();
            diag.mean_shift_removed = curve.normalize_zero_mean();
            apply_scalar_shifts(field, &curve, params);
            curve
        }
        AlignMethod::MedianOfDifferences | AlignMethod::TrimmedMeanOfDifferences => {
            let trim = params.method.effective_trim(params.trim_fraction);
            let incs = trimmed::difference_increments(field, mask, policy, trim, params.parallel);
            let mut curve = accumulate_increments(incs, &mut diag);
            diag.mean_shift_removed = curve.normalize_zero_mean();
            apply_scalar_shifts(field, &curve, params);
            curve
        }
        AlignMethod::Modus => {
            let levels = modus::row_levels(field, mask, policy, params.parallel);
            let mut curve = ShiftCurve::from_levels(levels);
            diag.degenerate_lanes = curve.len() - curve.valid_count();
            diag.mean_shift_removed = curve.normalize_zero_mean();
            apply_scalar_shifts(field, &curve, params);
            curve
        }
        AlignMethod::Match => {
            let incs = matching::pair_increments(field, mask, policy, params.parallel);
            let mut curve = accumulate_increments(incs, &mut diag);
            diag.mean_shift_removed = curve.normalize_zero_mean();
            apply_scalar_shifts(field, &curve, params);
            curve
        }
        AlignMethod::FacetTilt => {
            let report = facet::level_rows(field, mask, policy, params.parallel);
            diag.degenerate_lanes = report.skipped;
            diag.unconverged_lanes = report.unconverged;
            // No scalar per row exists for this method; the grid carries
            // the correction and the curve stays at the identity.
            ShiftCurve::zeros(field.yres)
        }
        AlignMethod::Polynomial => {
            let fit = poly::fit_rows(field, mask, policy, params.degree, params.parallel);
            diag.degenerate_lanes = fit.degenerate;
            diag.singular_fits = fit.singular;
            // The global mean is added back inside the applied correction,
            // so the grid level is preserved without re-normalizing the
            // curve (which must stay consistent with the background).
            let avg = field.masked_mean(mask, policy).unwrap_or(0.0);
            let curve = ShiftCurve::from_levels(
                fit.coeffs
                    .iter()
                    .map(|c| c.as_ref().map(|c| c[0] - avg))
                    .collect(),
            );
            apply_polynomials(field, &fit.coeffs, avg, params);
            curve
        }
    };

    for (b, c) in background.data.iter_mut().zip(field.data.iter()) {
        *b -= *c;
    }

    Ok(Alignment {
        shifts,
        background,
        diagnostics: diag,
    })
}

/// Turn per-pair increments into an absolute curve anchored at lane 0.
///
/// A pair without usable weight contributes increment 0, so the previous
/// cumulative value propagates unchanged.
fn accumulate_increments(incs: Vec<Option<f64>>, diag: &mut AlignDiagnostics) -> ShiftCurve {
    let mut curve = ShiftCurve::zeros(incs.len());
    let mut cum = 0.0;
    for (i, inc) in incs.into_iter().enumerate() {
        match inc {
            Some(d) => cum += d,
            None => diag.zero_weight_pairs += 1,
        }
        curve.values[i] = cum;
    }
    curve
}

fn apply_scalar_shifts(field: &mut Field, curve: &ShiftCurve, params: &AlignParams) {
    let xres = field.xres;
    let values = &curve.values;
    let valid = &curve.valid;
    for_each_row_mut(&mut field.data, xres, params.parallel, |y, row| {
        if valid[y] && values[y] != 0.0 {
            let s = values[y];
            for v in row.iter_mut() {
                *v -= s;
            }
        }
    });
}

fn apply_polynomials(
    field: &mut Field,
    coeffs: &[Option<Vec<f64>>],
    avg: f64,
    params: &AlignParams,
) {
    let xres = field.xres;
    let dx = field.dx;
    let centre = 0.5 * (xres as f64 - 1.0) * dx;
    for_each_row_mut(&mut field.data, xres, params.parallel, |y, row| {
        if let Some(c) = &coeffs[y] {
            for (j, v) in row.iter_mut().enumerate() {
                let x = j as f64 * dx - centre;
                *v -= poly::eval(c, x) - avg;
            }
        }
    });
}
