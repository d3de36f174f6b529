//! Local anisotropic smoothing by solving a diffusion system.
use glam::Mat2;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::grid::Grid2;
use crate::smoothing::kernel::LocalDiffusionKernel;
use crate::tensors::{resolve, to_mat2, Tensors2};

/// Smoothing filter that solves `(I + G'(c s D)G) y = x` by conjugate gradients.
#[derive(Clone, Debug)]
pub struct LocalSmoothingFilter {
    small: f64,
    max_iterations: usize,
    kernel: LocalDiffusionKernel,
    preconditioner: bool,
}

impl LocalSmoothingFilter {
    /// Iterations stop once the residual norm falls to `small` times the input norm.
    pub fn new(small: f64, max_iterations: usize, kernel: LocalDiffusionKernel) -> Self {
        Self {
            small,
            max_iterations,
            kernel,
            preconditioner: true,
        }
    }

    /// Enables or disables the diagonal (Jacobi) preconditioner. Enabled by default.
    pub fn with_preconditioner(mut self, preconditioner: bool) -> Self {
        self.preconditioner = preconditioner;
        self
    }

    pub fn kernel(&self) -> LocalDiffusionKernel {
        self.kernel
    }

    /// Smooth `x` with tensors scaled by `c` and the per-sample diffusivity `s`.
    pub fn apply(
        &self,
        tensors: &dyn Tensors2,
        c: f32,
        s: &Grid2<f32>,
        x: &Grid2<f32>,
    ) -> Result<Grid2<f32>> {
        x.ensure_same_shape(s, "diffusivity")?;
        if let Some(bad) = s.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(Error::InvalidArgument(format!(
                "diffusivity must be finite and non-negative, found {bad}"
            )));
        }

        let (n1, n2) = x.shape();
        let mut d = resolve(tensors, n1, n2)?.map(|&t| to_mat2(t));
        for (di, &si) in d.data.iter_mut().zip(&s.data) {
            *di *= c * si;
        }

        let inv_diag = if self.preconditioner {
            self.kernel.diagonal(&d).map(|&v| 1.0 / (1.0 + v))
        } else {
            Grid2::new(n1, n2, 1.0)
        };

        self.solve(&d, &inv_diag, x)
    }

    fn solve(&self, d: &Grid2<Mat2>, inv_diag: &Grid2<f32>, b: &Grid2<f32>) -> Result<Grid2<f32>> {
        let (n1, n2) = b.shape();
        let mut y = Grid2::new(n1, n2, 0.0f32);
        let bnorm = dot(b, b).sqrt();
        if bnorm == 0.0 {
            return Ok(y);
        }
        let tol = self.small * bnorm;

        let mut r = b.clone();
        let mut z = precondition(inv_diag, &r);
        let mut p = z.clone();
        let mut rz = dot(&r, &z);
        let mut q = Grid2::new(n1, n2, 0.0f32);

        let mut rnorm = bnorm;
        for iteration in 0..self.max_iterations {
            if !rnorm.is_finite() {
                break;
            }
            if rnorm <= tol {
                debug!(
                    "Smoothing converged after {} iterations (residual {:.3e}).",
                    iteration,
                    rnorm / bnorm
                );
                return Ok(y);
            }

            // q = (I + G'DG) p
            q.data.copy_from_slice(&p.data);
            self.kernel.apply(d, &p, &mut q);
            let pq = dot(&p, &q);
            if !(pq.is_finite() && pq > 0.0) {
                break;
            }
            let alpha = rz / pq;
            axpy(alpha, &p, &mut y);
            axpy(-alpha, &q, &mut r);

            z = precondition(inv_diag, &r);
            let rz_next = dot(&r, &z);
            let beta = rz_next / rz;
            rz = rz_next;
            for (pi, &zi) in p.data.iter_mut().zip(&z.data) {
                *pi = zi + (beta as f32) * *pi;
            }

            rnorm = dot(&r, &r).sqrt();
            trace!("Smoothing iteration {}: residual {:.3e}.", iteration + 1, rnorm / bnorm);
        }

        if rnorm.is_finite() && rnorm <= tol {
            return Ok(y);
        }
        Err(Error::NonConvergence {
            iterations: self.max_iterations,
            residual: rnorm / bnorm,
        })
    }

    /// Simple `[1/4 1/2 1/4]` smoothing along both axes, replicating edge samples.
    ///
    /// Attenuates features near the Nyquist frequency that finite differences
    /// cannot represent.
    pub fn apply_smooth_s(&self, x: &Grid2<f32>) -> Grid2<f32> {
        let (n1, n2) = x.shape();
        let mut t = x.clone();
        for i2 in 0..n2 {
            for i1 in 0..n1 {
                let m = x.get(i1.saturating_sub(1), i2);
                let p = x.get((i1 + 1).min(n1 - 1), i2);
                t.set(i1, i2, 0.25 * m + 0.5 * x.get(i1, i2) + 0.25 * p);
            }
        }
        let mut y = t.clone();
        for i2 in 0..n2 {
            let i2m = i2.saturating_sub(1);
            let i2p = (i2 + 1).min(n2 - 1);
            for i1 in 0..n1 {
                y.set(
                    i1,
                    i2,
                    0.25 * t.get(i1, i2m) + 0.5 * t.get(i1, i2) + 0.25 * t.get(i1, i2p),
                );
            }
        }
        y
    }
}

fn dot(a: &Grid2<f32>, b: &Grid2<f32>) -> f64 {
    a.data
        .iter()
        .zip(&b.data)
        .map(|(&x, &y)| x as f64 * y as f64)
        .sum()
}

fn axpy(alpha: f64, x: &Grid2<f32>, y: &mut Grid2<f32>) {
    let alpha = alpha as f32;
    for (yi, &xi) in y.data.iter_mut().zip(&x.data) {
        *yi += alpha * xi;
    }
}

fn precondition(inv_diag: &Grid2<f32>, r: &Grid2<f32>) -> Grid2<f32> {
    let mut z = r.clone();
    for (zi, &mi) in z.data.iter_mut().zip(&inv_diag.data) {
        *zi *= mi;
    }
    z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::Stencil;
    use crate::tensors::IsotropicTensors;

    fn filter(stencil: Stencil) -> LocalSmoothingFilter {
        LocalSmoothingFilter::new(1e-6, 1000, LocalDiffusionKernel::new(stencil))
    }

    #[test]
    fn zero_diffusivity_is_identity() {
        let x = Grid2::from_vec(3, 2, vec![1.0, -2.0, 3.0, 0.5, 4.0, -1.0]).unwrap();
        let s = Grid2::new(3, 2, 0.0);
        let y = filter(Stencil::D22)
            .apply(&IsotropicTensors, 0.5, &s, &x)
            .unwrap();
        for (a, b) in x.iter().zip(y.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_input_gives_zero_output() {
        let x = Grid2::new(4, 4, 0.0);
        let s = Grid2::new(4, 4, 1.0);
        let y = filter(Stencil::D21)
            .apply(&IsotropicTensors, 0.5, &s, &x)
            .unwrap();
        assert!(y.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn smoothing_preserves_sum_and_reduces_peak() {
        for stencil in [Stencil::D21, Stencil::D22] {
            let mut x = Grid2::new(7, 7, 0.0);
            x.set(3, 3, 1.0);
            let s = Grid2::new(7, 7, 4.0);
            let y = filter(stencil)
                .apply(&IsotropicTensors, 0.5, &s, &x)
                .unwrap();
            assert!((y.sum() - 1.0).abs() < 1e-4, "{stencil:?}");
            assert!(y.get(3, 3) < 1.0);
            assert!(y.get(3, 3) > y.get(0, 0));
        }
    }

    #[test]
    fn negative_diffusivity_is_rejected() {
        let x = Grid2::new(2, 2, 1.0);
        let s = Grid2::from_vec(2, 2, vec![1.0, -1.0, 0.0, 0.0]).unwrap();
        let err = filter(Stencil::D22)
            .apply(&IsotropicTensors, 0.5, &s, &x)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let mut x = Grid2::new(16, 16, 0.0);
        x.set(8, 8, 1.0);
        x.set(2, 11, -3.0);
        let s = Grid2::new(16, 16, 100.0);
        let f = LocalSmoothingFilter::new(1e-12, 1, LocalDiffusionKernel::new(Stencil::D22));
        let err = f.apply(&IsotropicTensors, 0.5, &s, &x).unwrap_err();
        assert!(matches!(err, Error::NonConvergence { iterations: 1, .. }));
    }

    #[test]
    fn smooth_s_keeps_constants_and_damps_nyquist() {
        let f = filter(Stencil::D22);
        let c = Grid2::new(4, 3, 2.0);
        assert_eq!(f.apply_smooth_s(&c), c);

        let alt = Grid2::from_vec(4, 1, vec![1.0, -1.0, 1.0, -1.0]).unwrap();
        let y = f.apply_smooth_s(&alt);
        assert_eq!(y.data, vec![0.5, 0.0, 0.0, -0.5]);
    }
}
