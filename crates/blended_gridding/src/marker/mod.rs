//! Shortest-time solvers over anisotropic tensor fields.
//!
//! A [`TimeMarker`] computes, for every cell, the time to the nearest seeded cell and
//! the mark (compact index) of that seed. Time is non-Euclidean distance: a step `dx`
//! at a cell with tensor `D` takes `sqrt(dx' D^-1 dx)`, with `dx` in samples. For the
//! isotropic default this is Euclidean distance measured in samples.
//!
//! Two solvers are available via [`TimeSolverKind`]; both are serial and deterministic.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Mat2;

use crate::error::{Error, Result};
use crate::grid::Grid2;
use crate::tensors::{resolve_metrics, Tensors2};

mod marching;
mod sweeping;
pub(crate) mod update;

/// Algorithm used to solve for times and marks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeSolverKind {
    /// Heap-ordered fast marching.
    #[default]
    Marching,
    /// Iterated Gauss-Seidel sweeps.
    Sweeping,
}

/// Computes times and marks for an `n1 x n2` grid and a tensor field.
#[derive(Clone, Debug)]
pub struct TimeMarker {
    kind: TimeSolverKind,
    metrics: Grid2<Mat2>,
}

impl TimeMarker {
    /// Resolve the tensor field once for all cells of an `n1 x n2` grid.
    pub fn new(n1: usize, n2: usize, tensors: &dyn Tensors2, kind: TimeSolverKind) -> Result<Self> {
        let metrics = resolve_metrics(tensors, n1, n2)?;
        Ok(Self { kind, metrics })
    }

    pub fn kind(&self) -> TimeSolverKind {
        self.kind
    }

    /// Solve in place.
    ///
    /// On input, cells with time zero are known and carry their mark; every other
    /// time is treated as unsolved. On output every time is finite and non-negative
    /// and every mark is copied from the seed nearest in time. Known cells are left
    /// unchanged. Requires at least one known cell.
    pub fn apply(&self, times: &mut Grid2<f32>, marks: &mut Grid2<usize>) -> Result<()> {
        self.metrics.ensure_same_shape(times, "times")?;
        self.metrics.ensure_same_shape(marks, "marks")?;
        if !times.iter().any(|&t| t == 0.0) {
            return Err(Error::InvalidState(
                "no known samples to compute times from".into(),
            ));
        }

        match self.kind {
            TimeSolverKind::Marching => marching::march(&self.metrics, times, marks),
            TimeSolverKind::Sweeping => sweeping::sweep(&self.metrics, times, marks),
        }
        Ok(())
    }
}
