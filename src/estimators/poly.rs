//! Per-row polynomial fit via Cholesky-decomposed normal equations.
//!
//! For degree `d` the row accumulates power sums `Σxᵏ` for `k = 0..2d` and
//! moment sums `Σxᵏ·z` for `k = 0..d`, with `x` measured from the row's
//! horizontal centre in physical units. The symmetric normal matrix is
//! solved through `nalgebra`'s Cholesky decomposition; a non-positive-
//! definite matrix or a row with fewer than `d + 1` usable samples degrades
//! to "no correction" for that row instead of propagating NaNs.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::field::Field;
use crate::mask::{MaskingPolicy, RowGate};
use crate::parallel::{map_rows, ParallelOptions};

/// Per-row fit results plus failure counters.
#[derive(Clone, Debug, Default)]
pub(crate) struct PolyFit {
    /// Ascending coefficients per row, `None` for rows without a fit.
    pub coeffs: Vec<Option<Vec<f64>>>,
    /// Rows with fewer usable samples than coefficients.
    pub degenerate: usize,
    /// Rows whose normal matrix was not positive definite.
    pub singular: usize,
}

enum RowFit {
    Fit(Vec<f64>),
    TooFewSamples,
    Singular,
}

/// Evaluate an ascending-coefficient polynomial at `x` (Horner form).
#[inline]
pub(crate) fn eval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn fit_row(row: &[f64], gate: &RowGate<'_>, dx: f64, degree: usize) -> RowFit {
    let terms = degree + 1;
    let centre = 0.5 * (row.len() as f64 - 1.0) * dx;

    let mut count = 0usize;
    let mut power_sums = vec![0.0; 2 * degree + 1];
    let mut moments = vec![0.0; terms];
    for (j, &z) in row.iter().enumerate() {
        if !gate.admits(j) {
            continue;
        }
        count += 1;
        let x = j as f64 * dx - centre;
        let mut xk = 1.0;
        for (k, s) in power_sums.iter_mut().enumerate() {
            *s += xk;
            if k < terms {
                moments[k] += xk * z;
            }
            xk *= x;
        }
    }
    if count < terms {
        return RowFit::TooFewSamples;
    }

    let normal = DMatrix::from_fn(terms, terms, |r, c| power_sums[r + c]);
    let rhs = DVector::from_fn(terms, |r, _| moments[r]);
    match normal.cholesky() {
        Some(chol) => RowFit::Fit(chol.solve(&rhs).iter().copied().collect()),
        None => RowFit::Singular,
    }
}

/// Fit every row with a degree-`degree` polynomial.
pub(crate) fn fit_rows(
    field: &Field,
    mask: Option<&Field>,
    policy: MaskingPolicy,
    degree: usize,
    par: ParallelOptions,
) -> PolyFit {
    let dx = field.dx;
    let fits = map_rows(field.yres, par, |y| {
        let gate = RowGate::new(mask, policy, y);
        fit_row(field.row(y), &gate, dx, degree)
    });

    let mut out = PolyFit {
        coeffs: Vec::with_capacity(fits.len()),
        ..Default::default()
    };
    for (y, fit) in fits.into_iter().enumerate() {
        match fit {
            RowFit::Fit(c) => out.coeffs.push(Some(c)),
            RowFit::TooFewSamples => {
                out.degenerate += 1;
                out.coeffs.push(None);
            }
            RowFit::Singular => {
                debug!("poly: normal matrix for row {y} is not positive definite");
                out.singular += 1;
                out.coeffs.push(None);
            }
        }
    }
    out
}
