mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use blended_gridding::prelude::*;
use common::*;

const N1: usize = 31;
const N2: usize = 23;

fn gridder_for<'a>(scatter: &'a Scatter, solver: TimeSolverKind, stencil: Stencil) -> BlendedGridder<'a> {
    let mut gridder = BlendedGridder::with_scattered(&scatter.f, &scatter.x1, &scatter.x2);
    gridder.set_time_solver(solver);
    gridder.set_blending_kernel(LocalDiffusionKernel::new(stencil));
    gridder
}

#[test]
fn known_values_are_preserved() {
    let scatter = random_scatter(0x5EED, 40, N1, N2);
    let (s1, s2) = (unit_axis(N1), unit_axis(N2));
    let known = rasterize(&scatter, &s1, &s2);
    for solver in solvers() {
        for stencil in stencils() {
            for blending in [true, false] {
                let mut gridder = gridder_for(&scatter, solver, stencil);
                gridder.set_blending(blending);
                let q = gridder.grid(&s1, &s2).unwrap();
                for (&k, &v) in known.iter().zip(q.iter()) {
                    if k != NULL_VALUE {
                        assert_eq!(v, k, "{solver:?} {stencil:?} blending={blending}");
                    }
                }
            }
        }
    }
}

#[test]
fn times_are_nonnegative_and_capped() {
    let scatter = random_scatter(7, 25, N1, N2);
    let (s1, s2) = (unit_axis(N1), unit_axis(N2));
    for solver in solvers() {
        for time_max in [1.5, f32::MAX] {
            let mut p = rasterize(&scatter, &s1, &s2);
            let mut gridder = BlendedGridder::new();
            gridder.set_time_solver(solver);
            gridder.set_time_max(time_max);
            let t = gridder.grid_nearest_null(NULL_VALUE, &mut p).unwrap();
            assert!(t.iter().all(|&v| v >= 0.0 && v <= time_max));
            if time_max < f32::MAX {
                assert!(t.iter().any(|&v| v == time_max));
            }
        }
    }
}

#[test]
fn marks_enumerate_known_samples() {
    let scatter = random_scatter(11, 30, N1, N2);
    let (s1, s2) = (unit_axis(N1), unit_axis(N2));
    for solver in solvers() {
        let mut p = rasterize(&scatter, &s1, &s2);
        let mut t = p.map(|&v| if v == NULL_VALUE { NULL_VALUE } else { 0.0 });
        let known: Vec<f32> = p.iter().copied().filter(|&v| v != NULL_VALUE).collect();

        let mut gridder = BlendedGridder::new();
        gridder.set_time_solver(solver);
        let marks = gridder.grid_nearest(&mut t, &mut p).unwrap();

        let used: BTreeSet<usize> = marks.iter().copied().collect();
        let expected: BTreeSet<usize> = (0..known.len()).collect();
        assert_eq!(used, expected, "{solver:?}");
        for (&m, &v) in marks.iter().zip(p.iter()) {
            assert_eq!(v, known[m]);
        }
    }
}

#[test]
fn gridding_is_deterministic() {
    let scatter = random_scatter(99, 35, N1, N2);
    let (s1, s2) = (unit_axis(N1), unit_axis(N2));
    for solver in solvers() {
        for stencil in stencils() {
            let a = gridder_for(&scatter, solver, stencil).grid(&s1, &s2).unwrap();
            let b = gridder_for(&scatter, solver, stencil).grid(&s1, &s2).unwrap();
            let bits_a: Vec<u32> = a.iter().map(|v| v.to_bits()).collect();
            let bits_b: Vec<u32> = b.iter().map(|v| v.to_bits()).collect();
            assert_eq!(bits_a, bits_b, "{solver:?} {stencil:?}");
        }
    }
}

#[test]
fn disabled_blending_returns_nearest_field() {
    let scatter = random_scatter(3, 20, N1, N2);
    let (s1, s2) = (unit_axis(N1), unit_axis(N2));
    for solver in solvers() {
        let mut gridder = gridder_for(&scatter, solver, Stencil::D22);
        gridder.set_blending(false);
        let q = gridder.grid(&s1, &s2).unwrap();

        let mut p = rasterize(&scatter, &s1, &s2);
        gridder.grid_nearest_null(NULL_VALUE, &mut p).unwrap();
        assert_eq!(q, p, "{solver:?}");
    }
}

#[test]
fn blending_preserves_mean_of_nearest_field() {
    let scatter = random_scatter(21, 12, N1, N2);
    let (s1, s2) = (unit_axis(N1), unit_axis(N2));
    for solver in solvers() {
        for stencil in stencils() {
            let mut gridder = gridder_for(&scatter, solver, stencil);
            gridder.set_config(
                gridder
                    .config()
                    .clone()
                    .with_blend_solver(1e-6, 10_000),
            );

            let mut p = rasterize(&scatter, &s1, &s2);
            let t = gridder.grid_nearest_null(NULL_VALUE, &mut p).unwrap();
            let q = gridder.grid_blended(&t, &p).unwrap();

            let mean = p.mean();
            assert!(mean.abs() > 1.0, "{mean}");
            // Known samples are decoupled from the diffusion with the one-sided stencil;
            // the dual-cell shift of the centred stencil couples them, so restoring them
            // moves the mean slightly.
            let tolerance = match stencil {
                Stencil::D21 => 1e-4 * mean.abs().max(1.0),
                Stencil::D22 => 0.05 * mean.abs().max(1.0),
            };
            assert!(
                approx_eq(q.mean(), mean, tolerance),
                "{solver:?} {stencil:?}: {} vs {mean}",
                q.mean()
            );
        }
    }
}

#[test]
fn anisotropic_tensors_stretch_nearest_regions() {
    // Two seeds on the diagonal of a square grid; with fast travel along x1 the cell at
    // (8, 0) belongs to the seed sharing its row even though the other is as close.
    let f = [1.0, 2.0];
    let x1 = [0.0, 8.0];
    let x2 = [0.0, 8.0];
    let (s1, s2) = (unit_axis(9), unit_axis(9));
    for solver in solvers() {
        let mut gridder = BlendedGridder::with_tensors_and_scattered(
            Arc::new(ConstantTensors::new(9.0, 0.0, 1.0)),
            &f,
            &x1,
            &x2,
        );
        gridder.set_time_solver(solver);
        gridder.set_blending(false);
        let q = gridder.grid(&s1, &s2).unwrap();
        assert_eq!(q.get(8, 0), 1.0, "{solver:?}");
        assert_eq!(q.get(0, 8), 2.0, "{solver:?}");
    }
}

#[test]
fn invalid_tensors_are_rejected() {
    let f = [1.0];
    let x = [1.0];
    let (s1, s2) = (unit_axis(3), unit_axis(3));
    let mut gridder = BlendedGridder::with_tensors_and_scattered(
        Arc::new(ConstantTensors::new(1.0, 2.0, 1.0)),
        &f,
        &x,
        &x,
    );
    let err = gridder.grid(&s1, &s2).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn invalid_config_is_rejected() {
    let f = [1.0];
    let x = [1.0];
    let (s1, s2) = (unit_axis(3), unit_axis(3));
    let mut gridder = BlendedGridder::with_scattered(&f, &x, &x);
    gridder.set_smoothness(0.0);
    let err = gridder.grid(&s1, &s2).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}
