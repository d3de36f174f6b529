//! Configuration of the gridding engine.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::marker::TimeSolverKind;
use crate::smoothing::{LocalDiffusionKernel, Stencil};

/// Settings that control both gridding stages.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct GridderConfig {
    /// Blend (smooth) the nearest-neighbor field after computing it.
    pub blending: bool,
    /// Diffusion kernel used for blending.
    pub kernel: LocalDiffusionKernel,
    /// Smoothness constant `c = 0.25 / smoothness`.
    pub smoothness_constant: f32,
    /// Times above this value are clamped to it.
    pub time_max: f32,
    /// Solver used for times and marks.
    pub time_solver: TimeSolverKind,
    /// Relative residual at which the blending solve stops.
    pub blend_tolerance: f64,
    /// Iteration cap of the blending solve.
    pub blend_max_iterations: usize,
}

impl Default for GridderConfig {
    fn default() -> Self {
        Self {
            blending: true,
            kernel: LocalDiffusionKernel::new(Stencil::D22),
            smoothness_constant: 0.5,
            time_max: f32::MAX,
            time_solver: TimeSolverKind::Marching,
            blend_tolerance: 0.01,
            blend_max_iterations: 10_000,
        }
    }
}

impl GridderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables blending.
    pub fn with_blending(mut self, blending: bool) -> Self {
        self.blending = blending;
        self
    }

    /// Sets the blending kernel.
    pub fn with_kernel(mut self, kernel: LocalDiffusionKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Sets the smoothness of the interpolant.
    ///
    /// The default 0.5 gives linear precision; larger values give smoother results
    /// with plateaus at known samples.
    pub fn with_smoothness(mut self, smoothness: f32) -> Self {
        self.smoothness_constant = 0.25 / smoothness;
        self
    }

    /// Smoothness corresponding to the stored smoothness constant.
    pub fn smoothness(&self) -> f32 {
        0.25 / self.smoothness_constant
    }

    /// Sets the maximum time. The interpolant has linear precision below it.
    pub fn with_time_max(mut self, time_max: f32) -> Self {
        self.time_max = time_max;
        self
    }

    /// Sets the time solver.
    pub fn with_time_solver(mut self, time_solver: TimeSolverKind) -> Self {
        self.time_solver = time_solver;
        self
    }

    /// Sets the tolerance and iteration cap of the blending solve.
    pub fn with_blend_solver(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.blend_tolerance = tolerance;
        self.blend_max_iterations = max_iterations;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothness_constant.is_finite() && self.smoothness_constant > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "smoothness constant must be finite and > 0, got {}",
                self.smoothness_constant
            )));
        }
        if !(self.time_max >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "time_max must be >= 0, got {}",
                self.time_max
            )));
        }
        if !(self.blend_tolerance.is_finite() && self.blend_tolerance > 0.0) {
            return Err(Error::InvalidConfig(
                "blend_tolerance must be finite and > 0".into(),
            ));
        }
        if self.blend_max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "blend_max_iterations must be > 0".into(),
            ));
        }
        Ok(())
    }
}
