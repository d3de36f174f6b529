#![allow(dead_code)]

use blended_gridding::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Randomly scattered samples inside an `n1 x n2` grid with unit spacing.
pub struct Scatter {
    pub f: Vec<f32>,
    pub x1: Vec<f32>,
    pub x2: Vec<f32>,
}

pub fn random_scatter(seed: u64, count: usize, n1: usize, n2: usize) -> Scatter {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scatter = Scatter {
        f: Vec::with_capacity(count),
        x1: Vec::with_capacity(count),
        x2: Vec::with_capacity(count),
    };
    for _ in 0..count {
        scatter.x1.push(rand01(&mut rng) * (n1 - 1) as f32);
        scatter.x2.push(rand01(&mut rng) * (n2 - 1) as f32);
        scatter.f.push(100.0 * rand01(&mut rng) - 50.0);
    }
    scatter
}

pub fn unit_axis(n: usize) -> Sampling {
    Sampling::new(n, 1.0, 0.0).unwrap()
}

/// Rasterized known values, with [`NULL_VALUE`] in cells without samples.
pub fn rasterize(scatter: &Scatter, s1: &Sampling, s2: &Sampling) -> Grid2<f32> {
    SimpleGridder::new(&scatter.f, &scatter.x1, &scatter.x2)
        .unwrap()
        .with_null_value(NULL_VALUE)
        .grid(s1, s2)
}

pub fn solvers() -> [TimeSolverKind; 2] {
    [TimeSolverKind::Marching, TimeSolverKind::Sweeping]
}

pub fn stencils() -> [Stencil; 2] {
    [Stencil::D21, Stencil::D22]
}

pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
