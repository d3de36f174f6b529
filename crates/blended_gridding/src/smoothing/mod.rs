//! Anisotropic diffusion used to blend nearest-neighbor fields.
//!
//! [`LocalDiffusionKernel`] applies the finite-difference operator `G' D G` for a
//! chosen [`Stencil`]; [`LocalSmoothingFilter`] solves the implicit diffusion system
//! built from it.
pub mod filter;
pub mod kernel;

pub use filter::LocalSmoothingFilter;
pub use kernel::{LocalDiffusionKernel, Stencil};
