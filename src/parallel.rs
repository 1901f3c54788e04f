//! Row-partitioned parallel execution harness.
//!
//! Every estimator decomposes into independent per-row computations that
//! read shared input and write disjoint outputs, so the harness is a pair of
//! map/for-each helpers with a sequential fallback. Whether Rayon is used is
//! decided by an explicit [`ParallelOptions`] carried in the call parameters
//! rather than process-wide state; small grids stay sequential because the
//! fork-join overhead dominates below a few dozen rows.

use serde::{Deserialize, Serialize};

/// Controls whether per-row work runs sequentially or with Rayon.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelOptions {
    enabled: bool,
    min_rows_for_parallel: usize,
}

impl ParallelOptions {
    /// Construct explicit options.
    pub fn new(enabled: bool, min_rows_for_parallel: usize) -> Self {
        Self {
            enabled,
            min_rows_for_parallel: min_rows_for_parallel.max(1),
        }
    }

    /// Disable parallel execution regardless of row count.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min_rows_for_parallel: usize::MAX,
        }
    }

    /// Returns true when parallel execution should be used for `rows`.
    pub fn should_parallelize(&self, rows: usize) -> bool {
        self.enabled && rows >= self.min_rows_for_parallel
    }

    /// Update the minimum row threshold for parallel execution.
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows_for_parallel = min_rows.max(1);
        self
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_rows_for_parallel: 64,
        }
    }
}

/// Apply `f` to every row index, collecting the results in row order.
pub(crate) fn map_rows<T, F>(rows: usize, opts: ParallelOptions, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    if opts.should_parallelize(rows) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            return (0..rows).into_par_iter().map(&f).collect();
        }
    }

    (0..rows).map(f).collect()
}

/// Apply `f` to every `(row_index, row_slice)` of a row-major buffer.
///
/// `row_len` must evenly divide `data.len()`; each worker owns exactly one
/// row slice, so no synchronization is needed.
pub(crate) fn for_each_row_mut<F>(data: &mut [f64], row_len: usize, opts: ParallelOptions, f: F)
where
    F: Fn(usize, &mut [f64]) + Sync,
{
    debug_assert!(row_len > 0 && data.len() % row_len == 0);
    let rows = data.len() / row_len;

    if opts.should_parallelize(rows) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            data.par_chunks_exact_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
            return;
        }
    }

    for (y, row) in data.chunks_exact_mut(row_len).enumerate() {
        f(y, row);
    }
}

/// Like [`for_each_row_mut`], collecting one result per row in row order.
pub(crate) fn map_rows_mut<T, F>(
    data: &mut [f64],
    row_len: usize,
    opts: ParallelOptions,
    f: F,
) -> Vec<T>
where
    T: Send,
    F: Fn(usize, &mut [f64]) -> T + Sync,
{
    debug_assert!(row_len > 0 && data.len() % row_len == 0);
    let rows = data.len() / row_len;

    if opts.should_parallelize(rows) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            return data
                .par_chunks_exact_mut(row_len)
                .enumerate()
                .map(|(y, row)| f(y, row))
                .collect();
        }
    }

    data.chunks_exact_mut(row_len)
        .enumerate()
        .map(|(y, row)| f(y, row))
        .collect()
}
