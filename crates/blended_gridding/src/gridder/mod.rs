//! Tensor-guided blended-neighbor gridding.
//!
//! Gridding interpolates known sample values onto every cell of a uniform grid in two
//! steps:
//! 1. Nearest neighbor: for every cell compute the time to the nearest known sample
//!    and take that sample's value. Time is distance measured in the metric of a
//!    tensor field, so "nearest" means nearest in time.
//! 2. Blending: smooth the nearest-neighbor field with an anisotropic diffusion whose
//!    local extent grows with the squared time. Known samples are never changed.
//!
//! With the default isotropic tensors, time is Euclidean distance and the result is
//! similar to natural neighbor interpolation.
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::grid::Grid2;
use crate::marker::TimeSolverKind;
use crate::sampling::Sampling;
use crate::scatter::SimpleGridder;
use crate::smoothing::LocalDiffusionKernel;
use crate::tensors::{IsotropicTensors, Tensors2};

pub mod blend;
pub mod config;
pub mod events;
pub mod nearest;

pub use config::GridderConfig;
pub use events::{EventSink, FnSink, GridEvent, VecSink};

/// Value marking cells without a known sample before the nearest-neighbor stage.
pub const NULL_VALUE: f32 = -f32::MAX;

/// Borrowed scattered samples: values and their coordinates.
#[derive(Clone, Copy, Debug)]
struct Scattered<'a> {
    f: &'a [f32],
    x1: &'a [f32],
    x2: &'a [f32],
}

/// Grids scattered samples by tensor-guided blended neighbors.
///
/// Configuration and scattered samples are engine state; scattered arrays are
/// borrowed, not copied. Setters take effect on the next call to [`Self::grid`].
pub struct BlendedGridder<'a> {
    tensors: Arc<dyn Tensors2>,
    config: GridderConfig,
    scattered: Option<Scattered<'a>>,
    time_solver_seconds: f64,
}

impl Default for BlendedGridder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> BlendedGridder<'a> {
    /// Creates a gridder with isotropic tensors and no samples.
    pub fn new() -> Self {
        Self {
            tensors: Arc::new(IsotropicTensors),
            config: GridderConfig::default(),
            scattered: None,
            time_solver_seconds: 0.0,
        }
    }

    /// Creates a gridder with the specified tensors.
    pub fn with_tensors(tensors: Arc<dyn Tensors2>) -> Self {
        let mut gridder = Self::new();
        gridder.set_tensors(Some(tensors));
        gridder
    }

    /// Creates a gridder with isotropic tensors for samples `f(x1, x2)`.
    pub fn with_scattered(f: &'a [f32], x1: &'a [f32], x2: &'a [f32]) -> Self {
        let mut gridder = Self::new();
        gridder.set_scattered(f, x1, x2);
        gridder
    }

    /// Creates a gridder with the specified tensors for samples `f(x1, x2)`.
    pub fn with_tensors_and_scattered(
        tensors: Arc<dyn Tensors2>,
        f: &'a [f32],
        x1: &'a [f32],
        x2: &'a [f32],
    ) -> Self {
        let mut gridder = Self::with_tensors(tensors);
        gridder.set_scattered(f, x1, x2);
        gridder
    }

    /// Sets the tensor field; `None` restores the isotropic default.
    pub fn set_tensors(&mut self, tensors: Option<Arc<dyn Tensors2>>) {
        self.tensors = tensors.unwrap_or_else(|| Arc::new(IsotropicTensors));
    }

    /// Tensor field used for times and blending.
    pub fn tensors(&self) -> &dyn Tensors2 {
        self.tensors.as_ref()
    }

    /// Enables or disables blending in [`Self::grid`]. Enabled by default; when
    /// disabled, `grid` returns the nearest-neighbor field.
    pub fn set_blending(&mut self, blending: bool) {
        self.config.blending = blending;
    }

    /// Sets the diffusion kernel used for blending. The default uses a 2x2 stencil.
    pub fn set_blending_kernel(&mut self, kernel: LocalDiffusionKernel) {
        self.config.kernel = kernel;
    }

    /// Sets the smoothness; see [`GridderConfig::with_smoothness`].
    pub fn set_smoothness(&mut self, smoothness: f32) {
        self.config.smoothness_constant = 0.25 / smoothness;
    }

    /// Sets the maximum time.
    pub fn set_time_max(&mut self, time_max: f32) {
        self.config.time_max = time_max;
    }

    /// Selects the solver used for times and marks.
    pub fn set_time_solver(&mut self, time_solver: TimeSolverKind) {
        self.config.time_solver = time_solver;
    }

    /// Replaces the whole configuration.
    pub fn set_config(&mut self, config: GridderConfig) {
        self.config = config;
    }

    /// Configuration applied by the next call to [`Self::grid`].
    pub fn config(&self) -> &GridderConfig {
        &self.config
    }

    /// Sets the scattered samples `f(x1, x2)`. The arrays must have equal length.
    pub fn set_scattered(&mut self, f: &'a [f32], x1: &'a [f32], x2: &'a [f32]) {
        self.scattered = Some(Scattered { f, x1, x2 });
    }

    /// Wall-clock seconds spent in the time solver by the latest nearest-neighbor stage.
    pub fn time_solver_seconds(&self) -> f64 {
        self.time_solver_seconds
    }

    /// Grids the scattered samples onto the grid sampled by `s1` and `s2`.
    pub fn grid(&mut self, s1: &Sampling, s2: &Sampling) -> Result<Grid2<f32>> {
        self.grid_with_events(s1, s2, &mut ())
    }

    /// Like [`Self::grid`], reporting progress to `sink`.
    pub fn grid_with_events(
        &mut self,
        s1: &Sampling,
        s2: &Sampling,
        sink: &mut dyn EventSink,
    ) -> Result<Grid2<f32>> {
        if !s1.is_uniform() {
            return Err(Error::InvalidArgument("s1 must be uniform".into()));
        }
        if !s2.is_uniform() {
            return Err(Error::InvalidArgument("s2 must be uniform".into()));
        }
        let Some(scattered) = self.scattered else {
            return Err(Error::InvalidState(
                "scattered samples have not been set".into(),
            ));
        };
        self.config.validate()?;

        let (mut p, ignored) = SimpleGridder::new(scattered.f, scattered.x1, scattered.x2)?
            .with_null_value(NULL_VALUE)
            .grid_with_ignored(s1, s2);
        let mut t = p.map(|&v| if v != NULL_VALUE { 0.0 } else { NULL_VALUE });

        let known = t.iter().filter(|&&v| v == 0.0).count();
        sink.send(GridEvent::Rasterized {
            shape: t.shape(),
            known,
        });
        if ignored > 0 {
            sink.send(GridEvent::Warning {
                message: format!("ignored {ignored} scattered samples outside the grid"),
            });
        }
        if known == 0 {
            warn!("No scattered samples fall inside the grid.");
            sink.send(GridEvent::Warning {
                message: "no scattered samples fall inside the grid".into(),
            });
        }

        self.nearest_stage(&mut t, &mut p, sink)?;
        if !self.config.blending {
            return Ok(p);
        }

        let outcome = blend::grid_blended(&self.config, self.tensors.as_ref(), &t, &p)?;
        sink.send(GridEvent::BlendingFinished { mean: outcome.mean });
        Ok(outcome.blended)
    }

    /// Computes nearest-neighbor values for cells of `p` equal to `pnull`.
    ///
    /// Known (non-null) values are not changed. Returns the times to the nearest
    /// known samples: zero at known samples, positive elsewhere.
    pub fn grid_nearest_null(&mut self, pnull: f32, p: &mut Grid2<f32>) -> Result<Grid2<f32>> {
        let mut t = p.map(|&v| if v == pnull { NULL_VALUE } else { 0.0 });
        self.grid_nearest(&mut t, p)?;
        Ok(t)
    }

    /// Computes nearest-neighbor values for unknown cells, those with non-zero time.
    ///
    /// Known values in `p` (zero time in `t`) are not changed. On return `t` holds
    /// adjusted times, capped at the maximum time, and the returned map holds for
    /// every cell the index of its nearest known sample, numbering known samples in
    /// raster order.
    pub fn grid_nearest(&mut self, t: &mut Grid2<f32>, p: &mut Grid2<f32>) -> Result<Grid2<usize>> {
        self.nearest_stage(t, p, &mut ())
    }

    /// Computes blended-neighbor values from the output of [`Self::grid_nearest`].
    ///
    /// Values at known samples (zero time) are not changed.
    pub fn grid_blended(&self, t: &Grid2<f32>, p: &Grid2<f32>) -> Result<Grid2<f32>> {
        self.config.validate()?;
        let outcome = blend::grid_blended(&self.config, self.tensors.as_ref(), t, p)?;
        Ok(outcome.blended)
    }

    fn nearest_stage(
        &mut self,
        t: &mut Grid2<f32>,
        p: &mut Grid2<f32>,
        sink: &mut dyn EventSink,
    ) -> Result<Grid2<usize>> {
        self.config.validate()?;
        let outcome = nearest::grid_nearest(&self.config, self.tensors.as_ref(), t, p)?;
        self.time_solver_seconds = outcome.seconds;
        debug!("Nearest-neighbor stage finished.");
        sink.send(GridEvent::TimesSolved {
            solver: self.config.time_solver,
            seconds: outcome.seconds,
        });
        sink.send(GridEvent::NearestFinished);
        Ok(outcome.marks)
    }
}
