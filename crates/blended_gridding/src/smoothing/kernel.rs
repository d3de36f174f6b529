//! Local diffusion kernels: finite-difference stencils for `G' D G`.
use std::ops::Range;

use glam::{Mat2, Vec2};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::Grid2;

/// Finite-difference stencil used to approximate gradients.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stencil {
    /// One-sided 2x1 differences evaluated at the sample itself.
    D21,
    /// Centred 2x2 differences evaluated half a sample up and left of the sample.
    #[default]
    D22,
}

/// Applies the diffusion operator `G' D G` for a chosen [`Stencil`].
///
/// Gradients are evaluated on dual cells `(i1, i2)` for `i = 1..n` on each axis,
/// coupling a sample with its predecessors along both axes. An axis with a single
/// sample collapses to the dual index 0 so that thin grids still diffuse along the
/// other axis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalDiffusionKernel {
    stencil: Stencil,
}

type StencilPoints = [(usize, Vec2); 4];

impl LocalDiffusionKernel {
    pub fn new(stencil: Stencil) -> Self {
        Self { stencil }
    }

    pub fn stencil(&self) -> Stencil {
        self.stencil
    }

    /// Dual-cell range along an axis with `n` samples.
    #[inline]
    pub(crate) fn dual_range(n: usize) -> Range<usize> {
        if n > 1 {
            1..n
        } else {
            0..n
        }
    }

    /// Samples and gradient weights of dual cell `(i1, i2)`.
    fn points(&self, i1: usize, i2: usize, n1: usize) -> StencilPoints {
        let i1m = i1.saturating_sub(1);
        let i2m = i2.saturating_sub(1);
        let j00 = i2 * n1 + i1;
        let j01 = i2 * n1 + i1m;
        let j10 = i2m * n1 + i1;
        let j11 = i2m * n1 + i1m;
        match self.stencil {
            Stencil::D21 => [
                (j00, Vec2::new(1.0, 1.0)),
                (j01, Vec2::new(-1.0, 0.0)),
                (j10, Vec2::new(0.0, -1.0)),
                (j11, Vec2::ZERO),
            ],
            Stencil::D22 => [
                (j00, Vec2::new(0.5, 0.5)),
                (j01, Vec2::new(-0.5, 0.5)),
                (j10, Vec2::new(0.5, -0.5)),
                (j11, Vec2::new(-0.5, -0.5)),
            ],
        }
    }

    /// Accumulate `y += G' D G x`, with `d` holding the tensor of each dual cell.
    pub fn apply(&self, d: &Grid2<Mat2>, x: &Grid2<f32>, y: &mut Grid2<f32>) {
        let (n1, n2) = x.shape();
        for i2 in Self::dual_range(n2) {
            for i1 in Self::dual_range(n1) {
                let pts = self.points(i1, i2, n1);
                let g = pts
                    .iter()
                    .fold(Vec2::ZERO, |g, &(j, c)| g + c * x.data[j]);
                let h = d.get(i1, i2) * g;
                for &(j, c) in &pts {
                    y.data[j] += c.dot(h);
                }
            }
        }
    }

    /// Diagonal of `G' D G`.
    pub fn diagonal(&self, d: &Grid2<Mat2>) -> Grid2<f32> {
        let (n1, n2) = d.shape();
        let mut diag = Grid2::new(n1, n2, 0.0f32);
        for i2 in Self::dual_range(n2) {
            for i1 in Self::dual_range(n1) {
                let pts = self.points(i1, i2, n1);
                let di = d.get(i1, i2);
                for &(jk, ck) in &pts {
                    for &(jl, cl) in &pts {
                        if jk == jl {
                            diag.data[jk] += ck.dot(di * cl);
                        }
                    }
                }
            }
        }
        diag
    }
}
