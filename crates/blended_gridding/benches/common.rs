use std::time::Duration;

use criterion::{Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Scattered samples `(f, x1, x2)` of a smooth surface over an `n x n` unit grid.
pub fn scattered(seed: u64, count: usize, n: usize) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let extent = (n - 1) as f32;
    let mut f = Vec::with_capacity(count);
    let mut x1 = Vec::with_capacity(count);
    let mut x2 = Vec::with_capacity(count);
    for _ in 0..count {
        let a = rand01(&mut rng) * extent;
        let b = rand01(&mut rng) * extent;
        x1.push(a);
        x2.push(b);
        f.push((a * 0.1).sin() + (b * 0.07).cos());
    }
    (f, x1, x2)
}

fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}
