//! Masking policy and the per-row participation gate.
//!
//! Mask values are fractional memberships in `[0, 1]`. The policy decides
//! whether a sample takes part in an estimator; the predicate sits in the
//! innermost loop of every method, so it stays branch-cheap.

use serde::{Deserialize, Serialize};

/// Rule deciding whether masked samples participate in an estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskingPolicy {
    /// The mask is not consulted; every sample participates.
    #[default]
    Ignore,
    /// Only samples with mask value >= 1 participate.
    Include,
    /// Only samples with mask value <= 0 participate.
    Exclude,
}

impl MaskingPolicy {
    /// Whether a sample with mask value `m` participates under this policy.
    #[inline]
    pub fn admits(self, m: f64) -> bool {
        match self {
            MaskingPolicy::Ignore => true,
            MaskingPolicy::Include => m >= 1.0,
            MaskingPolicy::Exclude => m <= 0.0,
        }
    }

    /// Whether this policy needs a mask grid at all.
    #[inline]
    pub fn uses_mask(self) -> bool {
        !matches!(self, MaskingPolicy::Ignore)
    }
}

/// Participation gate bound to one mask row.
///
/// Binding the row once keeps the inner loops free of repeated `Option`
/// plumbing; a gate without a mask row admits everything.
#[derive(Clone, Copy, Debug)]
pub struct RowGate<'a> {
    mask_row: Option<&'a [f64]>,
    policy: MaskingPolicy,
}

impl<'a> RowGate<'a> {
    /// Gate for row `y`, consulting `mask` only when the policy requires it.
    pub fn new(mask: Option<&'a crate::field::Field>, policy: MaskingPolicy, y: usize) -> Self {
        let mask_row = match (policy.uses_mask(), mask) {
            (true, Some(m)) => Some(m.row(y)),
            _ => None,
        };
        Self { mask_row, policy }
    }

    /// Whether column `j` participates.
    #[inline]
    pub fn admits(&self, j: usize) -> bool {
        match self.mask_row {
            Some(row) => self.policy.admits(row[j]),
            None => true,
        }
    }
}
