//! Dense 2D storage for gridded maps.
//!
//! [`Grid2`] stores `n1 * n2` values with axis 1 varying fastest, so the value for
//! cell `(i1, i2)` lives at `i2 * n1 + i1`. Time maps, mark maps, nearest and blended
//! fields all share this layout.
use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};

/// A dense `n1 x n2` array of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2<T> {
    n1: usize,
    n2: usize,
    pub data: Vec<T>,
}

impl<T: Copy> Grid2<T> {
    /// Create a grid with every cell set to `fill`.
    pub fn new(n1: usize, n2: usize, fill: T) -> Self {
        Self {
            n1,
            n2,
            data: vec![fill; n1 * n2],
        }
    }

    /// Wrap existing values laid out with axis 1 fastest.
    pub fn from_vec(n1: usize, n2: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != n1 * n2 {
            return Err(Error::InvalidArgument(format!(
                "grid of {}x{} needs {} values, got {}",
                n1,
                n2,
                n1 * n2,
                data.len()
            )));
        }
        Ok(Self { n1, n2, data })
    }

    /// Number of cells along axis 1.
    #[inline]
    pub fn n1(&self) -> usize {
        self.n1
    }

    /// Number of cells along axis 2.
    #[inline]
    pub fn n2(&self) -> usize {
        self.n2
    }

    /// Shape as `(n1, n2)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n1, self.n2)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of cell `(i1, i2)`.
    #[inline]
    pub fn index_of(&self, i1: usize, i2: usize) -> usize {
        debug_assert!(i1 < self.n1 && i2 < self.n2, "cell out of bounds");
        i2 * self.n1 + i1
    }

    /// Cell coordinates of a flat index.
    #[inline]
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index % self.n1, index / self.n1)
    }

    #[inline]
    pub fn get(&self, i1: usize, i2: usize) -> T {
        self.data[self.index_of(i1, i2)]
    }

    #[inline]
    pub fn set(&mut self, i1: usize, i2: usize, value: T) {
        let i = self.index_of(i1, i2);
        self.data[i] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Apply `f` to every value, producing a grid of the same shape.
    pub fn map<U: Copy>(&self, f: impl FnMut(&T) -> U) -> Grid2<U> {
        Grid2 {
            n1: self.n1,
            n2: self.n2,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Fail unless `other` has the same shape as `self`.
    pub fn ensure_same_shape<U>(&self, other: &Grid2<U>, what: &str) -> Result<()> {
        if self.n1 != other.n1 || self.n2 != other.n2 {
            return Err(Error::InvalidArgument(format!(
                "{what}: shape {}x{} does not match {}x{}",
                other.n1, other.n2, self.n1, self.n2
            )));
        }
        Ok(())
    }
}

impl Grid2<f32> {
    /// Sum of all values, accumulated in double precision.
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    /// Unweighted mean of all values; zero for an empty grid.
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        (self.sum() / self.data.len() as f64) as f32
    }
}

impl<T: Copy> Index<(usize, usize)> for Grid2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i1, i2): (usize, usize)) -> &T {
        &self.data[self.index_of(i1, i2)]
    }
}

impl<T: Copy> IndexMut<(usize, usize)> for Grid2<T> {
    #[inline]
    fn index_mut(&mut self, (i1, i2): (usize, usize)) -> &mut T {
        let i = self.index_of(i1, i2);
        &mut self.data[i]
    }
}
