//! Owned 2D measurement grid in row-major layout.
//!
//! `Field` stores `xres × yres` double-precision samples plus the physical
//! sample spacings along both axes. Rows are contiguous, so estimators work
//! on plain `&[f64]` slices; column-direction operation goes through
//! [`Field::transposed`], which also swaps the spacings.

use serde::{Deserialize, Serialize};

use crate::mask::MaskingPolicy;

/// Row-major grid of real-valued samples with physical sample spacings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Number of samples per row.
    pub xres: usize,
    /// Number of rows.
    pub yres: usize,
    /// Horizontal sample spacing (physical units per column step).
    pub dx: f64,
    /// Vertical sample spacing (physical units per row step).
    pub dy: f64,
    /// Backing storage in row-major order, `xres * yres` elements.
    pub data: Vec<f64>,
}

impl Field {
    /// Construct a zero-initialized grid of size `xres × yres`.
    pub fn new(xres: usize, yres: usize, dx: f64, dy: f64) -> Self {
        Self {
            xres,
            yres,
            dx,
            dy,
            data: vec![0.0; xres * yres],
        }
    }

    /// Construct from existing row-major data.
    ///
    /// Returns an error when the buffer length does not match `xres * yres`.
    pub fn from_data(
        xres: usize,
        yres: usize,
        dx: f64,
        dy: f64,
        data: Vec<f64>,
    ) -> Result<Self, String> {
        if data.len() != xres * yres {
            return Err(format!(
                "field data length {} does not match {}x{}",
                data.len(),
                xres,
                yres
            ));
        }
        Ok(Self {
            xres,
            yres,
            dx,
            dy,
            data,
        })
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.xres + x
    }

    #[inline]
    /// Get the sample value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    /// Set the sample value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f64) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    #[inline]
    /// Borrow row `y` as a contiguous slice.
    pub fn row(&self, y: usize) -> &[f64] {
        let start = y * self.xres;
        &self.data[start..start + self.xres]
    }

    #[inline]
    /// Borrow row `y` mutably.
    pub fn row_mut(&mut self, y: usize) -> &mut [f64] {
        let start = y * self.xres;
        let end = start + self.xres;
        &mut self.data[start..end]
    }

    /// Produce the transposed grid: rows become columns, spacings swap.
    pub fn transposed(&self) -> Field {
        let mut out = Field::new(self.yres, self.xres, self.dy, self.dx);
        for y in 0..self.yres {
            let row = self.row(y);
            for (x, &v) in row.iter().enumerate() {
                out.data[x * self.yres + y] = v;
            }
        }
        out
    }

    /// Mean of samples admitted by `policy` against `mask`.
    ///
    /// Returns `None` when no sample participates. A missing mask behaves
    /// like [`MaskingPolicy::Ignore`].
    pub fn masked_mean(&self, mask: Option<&Field>, policy: MaskingPolicy) -> Option<f64> {
        let mut sum = 0.0;
        let mut n = 0usize;
        match mask {
            Some(m) => {
                for (v, w) in self.data.iter().zip(m.data.iter()) {
                    if policy.admits(*w) {
                        sum += v;
                        n += 1;
                    }
                }
            }
            None => {
                for v in &self.data {
                    sum += v;
                }
                n = self.data.len();
            }
        }
        (n > 0).then(|| sum / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::Field;
    use crate::mask::MaskingPolicy;

    fn ramp(xres: usize, yres: usize) -> Field {
        let data = (0..xres * yres).map(|i| i as f64).collect();
        Field::from_data(xres, yres, 1.0, 1.0, data).expect("ramp field")
    }

    #[test]
    fn row_access_matches_indexing() {
        let f = ramp(4, 3);
        assert_eq!(f.row(1), &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(f.get(2, 1), 6.0);
    }

    #[test]
    fn from_data_rejects_bad_length() {
        assert!(Field::from_data(3, 3, 1.0, 1.0, vec![0.0; 8]).is_err());
    }

    #[test]
    fn transpose_round_trips() {
        let f = ramp(5, 3);
        let t = f.transposed();
        assert_eq!(t.xres, 3);
        assert_eq!(t.yres, 5);
        assert_eq!(t.get(1, 2), f.get(2, 1));
        assert_eq!(t.transposed(), f);
    }

    #[test]
    fn transpose_swaps_spacings() {
        let f = Field::new(2, 4, 0.5, 2.0);
        let t = f.transposed();
        assert_eq!(t.dx, 2.0);
        assert_eq!(t.dy, 0.5);
    }

    #[test]
    fn masked_mean_respects_policy() {
        let f = ramp(2, 2); // values 0,1,2,3
        let mask = Field::from_data(2, 2, 1.0, 1.0, vec![1.0, 0.0, 1.0, 0.0]).unwrap();
        let mean = f.masked_mean(Some(&mask), MaskingPolicy::Include).unwrap();
        assert_eq!(mean, 1.0); // samples 0 and 2
        let mean = f.masked_mean(Some(&mask), MaskingPolicy::Exclude).unwrap();
        assert_eq!(mean, 2.0); // samples 1 and 3
        let mean = f.masked_mean(Some(&mask), MaskingPolicy::Ignore).unwrap();
        assert_eq!(mean, 1.5);
    }

    #[test]
    fn masked_mean_empty_selection_is_none() {
        let f = ramp(2, 2);
        let mask = Field::new(2, 2, 1.0, 1.0); // all zero
        assert!(f.masked_mean(Some(&mask), MaskingPolicy::Include).is_none());
    }
}
