//! Sampling of one grid axis.
//!
//! A [`Sampling`] describes the coordinates of the samples along one axis of the
//! output grid. Gridding requires uniform samplings (constant spacing); arbitrary
//! monotonic samplings can still be described so that callers get a proper error.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Relative tolerance used to decide whether explicit sample values are evenly spaced.
const UNIFORM_TOLERANCE: f32 = 1.0e-5;

/// Sampling of one axis: `count` values, either uniform or explicit.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Sampling {
    count: usize,
    delta: f32,
    first: f32,
    /// Explicit values for a non-uniform sampling.
    values: Option<Vec<f32>>,
}

impl Sampling {
    /// Uniform sampling with `count` samples starting at `first`, spaced by `delta`.
    pub fn new(count: usize, delta: f32, first: f32) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidArgument("sampling count must be >= 1".into()));
        }
        if !(delta.is_finite() && delta > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "sampling delta must be > 0, got {delta}"
            )));
        }
        if !first.is_finite() {
            return Err(Error::InvalidArgument("sampling first must be finite".into()));
        }
        Ok(Self {
            count,
            delta,
            first,
            values: None,
        })
    }

    /// Sampling from explicit, strictly increasing values.
    ///
    /// Values that turn out to be evenly spaced yield a uniform sampling.
    pub fn from_values(values: Vec<f32>) -> Result<Self> {
        let Some(&first) = values.first() else {
            return Err(Error::InvalidArgument("sampling needs at least one value".into()));
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidArgument("sampling values must be finite".into()));
        }
        if values.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::InvalidArgument(
                "sampling values must be strictly increasing".into(),
            ));
        }
        if values.len() == 1 {
            return Self::new(1, 1.0, first);
        }

        let count = values.len();
        let last = values[count - 1];
        let delta = (last - first) / (count - 1) as f32;
        let tol = UNIFORM_TOLERANCE * delta.max(first.abs()).max(last.abs());
        let uniform = values
            .iter()
            .enumerate()
            .all(|(i, &v)| (v - (first + i as f32 * delta)).abs() <= tol);

        Ok(Self {
            count,
            delta,
            first,
            values: (!uniform).then_some(values),
        })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sample spacing; for non-uniform samplings this is the average spacing.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn first(&self) -> f32 {
        self.first
    }

    pub fn last(&self) -> f32 {
        self.value(self.count - 1)
    }

    /// Coordinate of sample `i`.
    pub fn value(&self, i: usize) -> f32 {
        match &self.values {
            Some(values) => values[i],
            None => self.first + i as f32 * self.delta,
        }
    }

    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.values.is_none()
    }

    /// Index of the sample nearest to `x`, clamped to `[0, count - 1]`.
    pub fn index_of_nearest(&self, x: f32) -> usize {
        let last = self.count - 1;
        match &self.values {
            None => {
                let r = ((x - self.first) / self.delta).round();
                if r <= 0.0 {
                    0
                } else {
                    (r as usize).min(last)
                }
            }
            Some(values) => {
                let upper = values.partition_point(|&v| v < x);
                if upper == 0 {
                    0
                } else if upper > last {
                    last
                } else if x - values[upper - 1] <= values[upper] - x {
                    upper - 1
                } else {
                    upper
                }
            }
        }
    }

    /// True if `x` lies within half a sample of the sampled range.
    pub fn is_in_bounds_extended(&self, x: f32) -> bool {
        let half = 0.5 * self.delta;
        x >= self.first - half && x <= self.last() + half
    }
}
