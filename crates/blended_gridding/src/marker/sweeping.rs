//! Fast sweeping: Gauss-Seidel passes in the four raster orderings until times settle.
use glam::Mat2;
use tracing::warn;

use crate::grid::Grid2;
use crate::marker::update::local_update;

const ORDERINGS: [(bool, bool); 4] = [(false, false), (true, false), (false, true), (true, true)];

/// Solve times and marks; cells with time zero are the seeds.
pub(crate) fn sweep(metrics: &Grid2<Mat2>, times: &mut Grid2<f32>, marks: &mut Grid2<usize>) {
    let (n1, n2) = times.shape();
    let known: Vec<bool> = times.iter().map(|&t| t == 0.0).collect();
    for (t, &k) in times.data.iter_mut().zip(&known) {
        if !k {
            *t = f32::INFINITY;
        }
    }

    let max_rounds = 4 * (n1 + n2) + 4;
    for _ in 0..max_rounds {
        let mut changed = false;
        for (rev1, rev2) in ORDERINGS {
            for k2 in 0..n2 {
                let i2 = if rev2 { n2 - 1 - k2 } else { k2 };
                for k1 in 0..n1 {
                    let i1 = if rev1 { n1 - 1 - k1 } else { k1 };
                    let index = i2 * n1 + i1;
                    if known[index] {
                        continue;
                    }
                    let candidate = local_update(i1, i2, metrics.get(i1, i2), times, marks, |j| {
                        times.data[j].is_finite()
                    });
                    if let Some(c) = candidate {
                        if c.time < times.data[index] {
                            times.data[index] = c.time;
                            marks.data[index] = c.mark;
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            return;
        }
    }
    warn!(
        "Time sweeping stopped after {} rounds without settling.",
        max_rounds
    );
}
