use blended_gridding::prelude::*;
use blended_gridding_examples::{init_tracing, render_field_to_png, RenderConfig};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::info;

const N: usize = 160;
const SAMPLES: usize = 60;

fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Smooth surface with a ridge, sampled at random positions.
fn surface(x1: f32, x2: f32) -> f32 {
    let u = x1 / N as f32;
    let v = x2 / N as f32;
    (6.0 * u).sin() * (4.0 * v).cos() + 2.0 * (-(u - v).powi(2) * 40.0).exp()
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut rng = StdRng::seed_from_u64(42);
    let mut f = Vec::with_capacity(SAMPLES);
    let mut x1 = Vec::with_capacity(SAMPLES);
    let mut x2 = Vec::with_capacity(SAMPLES);
    for _ in 0..SAMPLES {
        let a = rand01(&mut rng) * (N - 1) as f32;
        let b = rand01(&mut rng) * (N - 1) as f32;
        x1.push(a);
        x2.push(b);
        f.push(surface(a, b));
    }
    let s = Sampling::new(N, 1.0, 0.0)?;

    // The same samples gridded with nearest neighbors only, then blended.
    let mut gridder = BlendedGridder::with_scattered(&f, &x1, &x2);
    gridder.set_blending(false);
    let nearest = gridder.grid(&s, &s)?;
    info!(
        "Nearest neighbors took {:.3}s in the time solver.",
        gridder.time_solver_seconds()
    );

    gridder.set_blending(true);
    let mut events = VecSink::new();
    let blended = gridder.grid_with_events(&s, &s, &mut events)?;
    for event in events.as_slice() {
        info!("{event:?}");
    }

    let markers: Vec<(usize, usize)> = x1
        .iter()
        .zip(&x2)
        .map(|(&a, &b)| (s.index_of_nearest(a), s.index_of_nearest(b)))
        .collect();
    let (lo, hi) = f
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let rc = RenderConfig::new(4)
        .with_range(lo, hi)
        .with_markers(markers);

    render_field_to_png(&nearest, &rc, "nearest-vs-blended-nearest.png")?;

    // Times from the same rasterized samples, shown without markers.
    let mut p = SimpleGridder::new(&f, &x1, &x2)?
        .with_null_value(NULL_VALUE)
        .grid(&s, &s);
    let times = gridder.grid_nearest_null(NULL_VALUE, &mut p)?;
    render_field_to_png(&times, &RenderConfig::new(4), "nearest-vs-blended-times.png")?;

    render_field_to_png(&blended, &rc, "nearest-vs-blended-blended.png")?;

    let mut smoother = gridder;
    smoother.set_smoothness(2.0);
    let smooth = smoother.grid(&s, &s)?;
    render_field_to_png(&smooth, &rc, "nearest-vs-blended-smoothness-2.png")?;
    Ok(())
}
