use std::sync::Arc;

use blended_gridding::prelude::*;
use blended_gridding_examples::{init_tracing, render_field_to_png, RenderConfig};
use tracing::info;

const N: usize = 128;

/// Tensors aligned with concentric circles around the grid center, so that values
/// spread along rings rather than across them.
fn circular_tensors() -> GridTensors {
    let c = (N as f32 - 1.0) * 0.5;
    GridTensors::from_fn(N, N, |i1, i2| {
        let radial = mint::Vector2 {
            x: i1 as f32 - c,
            y: i2 as f32 - c,
        };
        // Fast along the tangent, slow along the radius.
        let tangent = mint::Vector2 {
            x: -radial.y,
            y: radial.x,
        };
        ConstantTensors::from_direction(tangent, 1.0, 0.05).d
    })
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    // A few samples on two rings with opposite values.
    let c = (N as f32 - 1.0) * 0.5;
    let mut f = Vec::new();
    let mut x1 = Vec::new();
    let mut x2 = Vec::new();
    for (radius, value) in [(20.0f32, 1.0f32), (45.0, -1.0)] {
        for k in 0..3 {
            let angle = k as f32 * std::f32::consts::TAU / 3.0 + radius * 0.01;
            x1.push(c + radius * angle.cos());
            x2.push(c + radius * angle.sin());
            f.push(value);
        }
    }
    let s = Sampling::new(N, 1.0, 0.0)?;
    let markers: Vec<(usize, usize)> = x1
        .iter()
        .zip(&x2)
        .map(|(&a, &b)| (s.index_of_nearest(a), s.index_of_nearest(b)))
        .collect();
    let rc = RenderConfig::new(4)
        .with_range(-1.0, 1.0)
        .with_markers(markers);

    let mut isotropic = BlendedGridder::with_scattered(&f, &x1, &x2);
    let q = isotropic.grid(&s, &s)?;
    render_field_to_png(&q, &rc, "anisotropic-tensors-isotropic.png")?;

    let tensors: Arc<dyn Tensors2> = Arc::new(circular_tensors());
    for stencil in [Stencil::D21, Stencil::D22] {
        let mut anisotropic =
            BlendedGridder::with_tensors_and_scattered(tensors.clone(), &f, &x1, &x2);
        anisotropic.set_time_solver(TimeSolverKind::Sweeping);
        anisotropic.set_blending_kernel(LocalDiffusionKernel::new(stencil));
        let q = anisotropic.grid(&s, &s)?;
        info!(
            "{:?}: anisotropic times took {:.3}s with {:?}.",
            stencil,
            anisotropic.time_solver_seconds(),
            anisotropic.config().time_solver
        );
        let name = format!("anisotropic-tensors-circular-{stencil:?}.png").to_lowercase();
        render_field_to_png(&q, &rc, name)?;
    }
    Ok(())
}
