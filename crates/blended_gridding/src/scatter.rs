//! Placement of scattered samples onto the nearest grid cells.
use tracing::warn;

use crate::error::{Error, Result};
use crate::grid::Grid2;
use crate::sampling::Sampling;

/// Grids scattered samples by nearest-cell placement.
///
/// Each sample within half a sample spacing of the grid is assigned to its nearest
/// cell; cells hit by several samples get their average. All other cells are set to
/// the null value. The sample arrays are borrowed, not copied.
#[derive(Clone, Debug)]
pub struct SimpleGridder<'a> {
    f: &'a [f32],
    x1: &'a [f32],
    x2: &'a [f32],
    null_value: f32,
}

impl<'a> SimpleGridder<'a> {
    /// Create a gridder for sample values `f` at coordinates `(x1, x2)`.
    pub fn new(f: &'a [f32], x1: &'a [f32], x2: &'a [f32]) -> Result<Self> {
        if f.len() != x1.len() || f.len() != x2.len() {
            return Err(Error::InvalidArgument(format!(
                "scattered arrays differ in length: f={}, x1={}, x2={}",
                f.len(),
                x1.len(),
                x2.len()
            )));
        }
        Ok(Self {
            f,
            x1,
            x2,
            null_value: 0.0,
        })
    }

    /// Sets the value assigned to cells that receive no sample.
    pub fn with_null_value(mut self, null_value: f32) -> Self {
        self.null_value = null_value;
        self
    }

    pub fn null_value(&self) -> f32 {
        self.null_value
    }

    /// Grid the samples onto the grid described by `s1` and `s2`.
    pub fn grid(&self, s1: &Sampling, s2: &Sampling) -> Grid2<f32> {
        self.grid_with_ignored(s1, s2).0
    }

    /// Like [`Self::grid`], also returning how many samples fell outside the grid.
    pub fn grid_with_ignored(&self, s1: &Sampling, s2: &Sampling) -> (Grid2<f32>, usize) {
        let (n1, n2) = (s1.count(), s2.count());
        let mut sums = Grid2::new(n1, n2, 0.0f64);
        let mut counts = Grid2::new(n1, n2, 0u32);

        let mut ignored = 0usize;
        for ((&f, &x1), &x2) in self.f.iter().zip(self.x1).zip(self.x2) {
            if !s1.is_in_bounds_extended(x1) || !s2.is_in_bounds_extended(x2) {
                ignored += 1;
                continue;
            }
            let i1 = s1.index_of_nearest(x1);
            let i2 = s2.index_of_nearest(x2);
            sums[(i1, i2)] += f as f64;
            counts[(i1, i2)] += 1;
        }
        if ignored > 0 {
            warn!("Ignored {} scattered samples outside the grid.", ignored);
        }

        let mut out = Grid2::new(n1, n2, self.null_value);
        for (i, value) in out.data.iter_mut().enumerate() {
            let c = counts.data[i];
            if c > 0 {
                *value = (sums.data[i] / c as f64) as f32;
            }
        }
        (out, ignored)
    }
}
