#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod aligner;
pub mod config;
pub mod curve;
pub mod field;
pub mod mask;
pub mod parallel;

// “Expert” modules – still public, but considered unstable internals.
pub mod estimators;
pub mod stats;

// --- High-level re-exports -------------------------------------------------

// Main entry points: aligner + results.
pub use crate::aligner::{align_rows, AlignDiagnostics, AlignParams, Alignment, Direction, RowAligner};

// Data model.
pub use crate::curve::ShiftCurve;
pub use crate::estimators::AlignMethod;
pub use crate::field::Field;
pub use crate::mask::MaskingPolicy;
pub use crate::parallel::ParallelOptions;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use row_align::prelude::*;
///
/// let mut field = Field::new(128, 128, 1.0, 1.0);
/// let report = RowAligner::new(AlignParams::default())
///     .align(&mut field, None)
///     .expect("valid config");
/// println!("removed mean level {:.3e}", report.diagnostics.mean_shift_removed);
/// ```
pub mod prelude {
    pub use crate::{AlignMethod, AlignParams, Field, MaskingPolicy, RowAligner};
}
