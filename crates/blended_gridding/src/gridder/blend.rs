//! Blending stage: smoothing the nearest-neighbor field with time-driven diffusivity.
use tracing::debug;

use crate::error::Result;
use crate::grid::Grid2;
use crate::gridder::config::GridderConfig;
use crate::smoothing::{LocalSmoothingFilter, Stencil};
use crate::tensors::Tensors2;

/// Blended field and the mean removed from the nearest field while smoothing.
#[derive(Clone, Debug)]
pub(crate) struct BlendOutcome {
    pub blended: Grid2<f32>,
    pub mean: f32,
}

/// Blend a nearest-neighbor field. Cells with zero time keep their value exactly.
pub(crate) fn grid_blended(
    config: &GridderConfig,
    tensors: &dyn Tensors2,
    times: &Grid2<f32>,
    nearest: &Grid2<f32>,
) -> Result<BlendOutcome> {
    times.ensure_same_shape(nearest, "nearest")?;
    let stencil = config.kernel.stencil();

    let mut s = times.map(|&t| (t * t).min(f32::MAX));
    if stencil != Stencil::D21 {
        shift_to_dual_cells(&mut s);
    }

    let lsf = LocalSmoothingFilter::new(
        config.blend_tolerance,
        config.blend_max_iterations,
        config.kernel,
    );
    let mean = nearest.mean();
    let mut r = nearest.map(|&p| p - mean);
    // Damps finite-difference noise near Nyquist. Skipped for D21, where it would
    // pull blended values away from adjacent known samples.
    if stencil != Stencil::D21 {
        r = lsf.apply_smooth_s(&r);
    }
    let mut blended = lsf.apply(tensors, config.smoothness_constant, &s, &r)?;

    for ((q, &t), &p) in blended
        .data
        .iter_mut()
        .zip(&times.data)
        .zip(&nearest.data)
    {
        *q = if t == 0.0 { p } else { *q + mean };
    }
    debug!("Blended {}x{} cells around mean {}.", times.n1(), times.n2(), mean);

    Ok(BlendOutcome { blended, mean })
}

/// Average each value with its predecessors over a 2x2 neighbourhood, in place.
///
/// Moves the diffusivity onto the dual cells used by centred stencils. Indices below
/// zero clamp to zero, so the first row and column average only along the other axis.
fn shift_to_dual_cells(s: &mut Grid2<f32>) {
    let (n1, n2) = s.shape();
    for i2 in (0..n2).rev() {
        let i2m = i2.saturating_sub(1);
        for i1 in (0..n1).rev() {
            let i1m = i1.saturating_sub(1);
            let v = 0.25 * (s.get(i1, i2) + s.get(i1m, i2) + s.get(i1, i2m) + s.get(i1m, i2m));
            s.set(i1, i2, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::LocalDiffusionKernel;
    use crate::tensors::IsotropicTensors;

    #[test]
    fn shift_averages_two_by_two() {
        let mut s = Grid2::from_vec(2, 2, vec![0.0, 4.0, 8.0, 12.0]).unwrap();
        shift_to_dual_cells(&mut s);
        assert_eq!(s.get(1, 1), 6.0);
        assert_eq!(s.get(1, 0), 2.0);
        assert_eq!(s.get(0, 1), 4.0);
        assert_eq!(s.get(0, 0), 0.0);
    }

    #[test]
    fn known_samples_are_restored() {
        for stencil in [Stencil::D21, Stencil::D22] {
            let cfg = GridderConfig::default().with_kernel(LocalDiffusionKernel::new(stencil));
            let times = Grid2::from_vec(4, 1, vec![0.0, 1.0, 0.0, 1.0]).unwrap();
            let nearest = Grid2::from_vec(4, 1, vec![1.0, 1.0, 5.0, 5.0]).unwrap();
            let out = grid_blended(&cfg, &IsotropicTensors, &times, &nearest).unwrap();
            assert_eq!(out.blended.get(0, 0), 1.0);
            assert_eq!(out.blended.get(2, 0), 5.0);
            assert_eq!(out.mean, 3.0);
        }
    }

    #[test]
    fn constant_field_keeps_its_mean() {
        for stencil in [Stencil::D21, Stencil::D22] {
            let cfg = GridderConfig::default().with_kernel(LocalDiffusionKernel::new(stencil));
            let times = Grid2::from_vec(4, 2, vec![0.0, 1.0, 2.0, 3.0, 1.0, 1.5, 2.2, 3.2]).unwrap();
            let nearest = Grid2::new(4, 2, 7.0);
            let out = grid_blended(&cfg, &IsotropicTensors, &times, &nearest).unwrap();
            assert_eq!(out.mean, 7.0);
            assert!(out.blended.iter().all(|v| *v == 7.0), "{stencil:?}");
        }
    }

    #[test]
    fn zero_times_everywhere_return_nearest() {
        let cfg = GridderConfig::default();
        let times = Grid2::new(3, 3, 0.0);
        let nearest = Grid2::from_vec(3, 3, (0..9).map(|v| v as f32).collect()).unwrap();
        let out = grid_blended(&cfg, &IsotropicTensors, &times, &nearest).unwrap();
        assert_eq!(out.blended, nearest);
    }
}
