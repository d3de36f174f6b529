//! Metric tensor fields that guide both gridding stages.
//!
//! A tensor field supplies, for every grid cell, a symmetric positive-definite 2x2
//! matrix `[[d11, d12], [d12, d22]]`:
//! - Define custom fields by implementing [`Tensors2`].
//! - Use [`IsotropicTensors`] for plain Euclidean distances (the default).
//! - Use [`ConstantTensors`] or [`GridTensors`] for anisotropic fields.
use glam::{Mat2, Vec2};
use mint::Vector2;

use crate::error::{Error, Result};
use crate::grid::Grid2;

/// Trait for fields of 2x2 symmetric positive-definite tensors indexed by grid cell.
///
/// Implementations must be deterministic and free of side effects; each numerical
/// stage queries every cell once.
pub trait Tensors2: Send + Sync {
    /// Tensor at cell `(i1, i2)` as `[d11, d12, d22]`.
    fn tensor(&self, i1: usize, i2: usize) -> [f32; 3];
}

/// Homogeneous isotropic tensors; time equals Euclidean distance in samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct IsotropicTensors;

impl Tensors2 for IsotropicTensors {
    #[inline]
    fn tensor(&self, _i1: usize, _i2: usize) -> [f32; 3] {
        [1.0, 0.0, 1.0]
    }
}

/// The same tensor for every cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantTensors {
    pub d: [f32; 3],
}

impl ConstantTensors {
    pub fn new(d11: f32, d12: f32, d22: f32) -> Self {
        Self { d: [d11, d12, d22] }
    }

    /// Tensor with eigenvalue `au` along direction `u` and `av` perpendicular to it.
    ///
    /// Larger eigenvalues make distances shorter and smoothing wider in that direction.
    pub fn from_direction(u: Vector2<f32>, au: f32, av: f32) -> Self {
        let u = Vec2::from(u).normalize_or(Vec2::X);
        let v = u.perp();
        let d11 = au * u.x * u.x + av * v.x * v.x;
        let d12 = au * u.x * u.y + av * v.x * v.y;
        let d22 = au * u.y * u.y + av * v.y * v.y;
        Self::new(d11, d12, d22)
    }
}

impl Tensors2 for ConstantTensors {
    #[inline]
    fn tensor(&self, _i1: usize, _i2: usize) -> [f32; 3] {
        self.d
    }
}

/// Tensors stored per cell. Queries outside the stored grid clamp to its edge.
#[derive(Clone, Debug)]
pub struct GridTensors {
    pub tensors: Grid2<[f32; 3]>,
}

impl GridTensors {
    pub fn new(tensors: Grid2<[f32; 3]>) -> Self {
        Self { tensors }
    }

    /// Build a field by evaluating `f` for every cell of an `n1 x n2` grid.
    pub fn from_fn(n1: usize, n2: usize, mut f: impl FnMut(usize, usize) -> [f32; 3]) -> Self {
        let mut tensors = Grid2::new(n1, n2, [1.0, 0.0, 1.0]);
        for i2 in 0..n2 {
            for i1 in 0..n1 {
                tensors.set(i1, i2, f(i1, i2));
            }
        }
        Self { tensors }
    }
}

impl Tensors2 for GridTensors {
    fn tensor(&self, i1: usize, i2: usize) -> [f32; 3] {
        if self.tensors.is_empty() {
            return [1.0, 0.0, 1.0];
        }
        let i1 = i1.min(self.tensors.n1() - 1);
        let i2 = i2.min(self.tensors.n2() - 1);
        self.tensors.get(i1, i2)
    }
}

/// Symmetric matrix for a tensor triple.
#[inline]
pub(crate) fn to_mat2(d: [f32; 3]) -> Mat2 {
    Mat2::from_cols(Vec2::new(d[0], d[1]), Vec2::new(d[1], d[2]))
}

fn check_positive_definite(d: [f32; 3], i1: usize, i2: usize) -> Result<()> {
    let det = d[0] * d[2] - d[1] * d[1];
    if d.iter().all(|v| v.is_finite()) && d[0] > 0.0 && det > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "tensor {:?} at cell ({}, {}) is not positive-definite",
            d, i1, i2
        )))
    }
}

/// Evaluate a tensor field over an `n1 x n2` grid, checking every tensor.
pub(crate) fn resolve(tensors: &dyn Tensors2, n1: usize, n2: usize) -> Result<Grid2<[f32; 3]>> {
    let mut out = Grid2::new(n1, n2, [1.0, 0.0, 1.0]);
    for i2 in 0..n2 {
        for i1 in 0..n1 {
            let d = tensors.tensor(i1, i2);
            check_positive_definite(d, i1, i2)?;
            out.set(i1, i2, d);
        }
    }
    Ok(out)
}

/// Evaluate and invert a tensor field: the per-cell metric used to measure time.
pub(crate) fn resolve_metrics(tensors: &dyn Tensors2, n1: usize, n2: usize) -> Result<Grid2<Mat2>> {
    let d = resolve(tensors, n1, n2)?;
    Ok(d.map(|&d| to_mat2(d).inverse()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn isotropic_is_identity() {
        assert_eq!(IsotropicTensors.tensor(3, 7), [1.0, 0.0, 1.0]);
    }

    #[test]
    fn from_direction_along_axis() {
        let t = ConstantTensors::from_direction(Vector2 { x: 2.0, y: 0.0 }, 4.0, 1.0);
        approx_eq(t.d[0], 4.0);
        approx_eq(t.d[1], 0.0);
        approx_eq(t.d[2], 1.0);
    }

    #[test]
    fn from_direction_diagonal_has_expected_eigenvector() {
        let u = Vector2 { x: 1.0, y: 1.0 };
        let t = ConstantTensors::from_direction(u, 3.0, 1.0);
        let m = to_mat2(t.d);
        let e = Vec2::new(1.0, 1.0).normalize();
        let me = m * e;
        approx_eq(me.x, 3.0 * e.x);
        approx_eq(me.y, 3.0 * e.y);
    }

    #[test]
    fn grid_tensors_clamp_out_of_range() {
        let field = GridTensors::from_fn(2, 2, |i1, i2| [1.0 + i1 as f32, 0.0, 1.0 + i2 as f32]);
        assert_eq!(field.tensor(1, 1), [2.0, 0.0, 2.0]);
        assert_eq!(field.tensor(9, 0), [2.0, 0.0, 1.0]);
    }

    #[test]
    fn resolve_rejects_indefinite_tensors() {
        let bad = ConstantTensors::new(1.0, 2.0, 1.0);
        let err = resolve(&bad, 2, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn metrics_invert_tensors() {
        let m = resolve_metrics(&ConstantTensors::new(4.0, 0.0, 0.25), 1, 1).unwrap();
        let w = m.get(0, 0);
        approx_eq(w.x_axis.x, 0.25);
        approx_eq(w.y_axis.y, 4.0);
    }
}
