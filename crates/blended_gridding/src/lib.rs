#![forbid(unsafe_code)]
//! blended_gridding: Tensor-guided blended-neighbor gridding of scattered 2D samples.
//!
//! Modules:
//! - grid, sampling: dense 2D arrays and uniform axis samplings
//! - tensors: structure tensor fields that define the metric of "nearest"
//! - scatter: placing scattered samples onto grid cells
//! - marker: eikonal time solvers (fast marching, fast sweeping)
//! - smoothing: anisotropic local diffusion and its conjugate-gradient solve
//! - gridder: the two-stage engine, configuration, and events
//!
//! For examples and docs, see README and docs.rs.
pub mod error;
pub mod grid;
pub mod gridder;
pub mod marker;
pub mod sampling;
pub mod scatter;
pub mod smoothing;
pub mod tensors;

/// Convenient re-exports for common types. Import with `use blended_gridding::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grid::Grid2;
    pub use crate::gridder::{
        BlendedGridder, EventSink, FnSink, GridEvent, GridderConfig, VecSink, NULL_VALUE,
    };
    pub use crate::marker::{TimeMarker, TimeSolverKind};
    pub use crate::sampling::Sampling;
    pub use crate::scatter::SimpleGridder;
    pub use crate::smoothing::{LocalDiffusionKernel, LocalSmoothingFilter, Stencil};
    pub use crate::tensors::{ConstantTensors, GridTensors, IsotropicTensors, Tensors2};
}
