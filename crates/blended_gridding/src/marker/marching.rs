//! Fast marching: cells are accepted in order of increasing time.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Mat2;

use crate::grid::Grid2;
use crate::marker::update::{local_update, neighbor, NEIGHBORS};

/// Heap entry ordered so that the smallest time (then smallest index) pops first.
#[derive(Clone, Copy, Debug)]
struct Trial {
    time: f32,
    index: usize,
}

impl PartialEq for Trial {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Trial {}

impl PartialOrd for Trial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Trial {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Solve times and marks; cells with time zero are the seeds.
pub(crate) fn march(metrics: &Grid2<Mat2>, times: &mut Grid2<f32>, marks: &mut Grid2<usize>) {
    let (n1, n2) = times.shape();
    let mut accepted = vec![false; times.len()];
    let mut heap = BinaryHeap::new();

    for (index, t) in times.data.iter_mut().enumerate() {
        if *t == 0.0 {
            heap.push(Trial { time: 0.0, index });
        } else {
            *t = f32::INFINITY;
        }
    }

    while let Some(Trial { time, index }) = heap.pop() {
        if accepted[index] || time > times.data[index] {
            continue;
        }
        accepted[index] = true;

        let (i1, i2) = times.cell_of(index);
        for &d in NEIGHBORS.iter() {
            let Some(j) = neighbor(i1, i2, d, n1, n2) else {
                continue;
            };
            if accepted[j] {
                continue;
            }
            let (j1, j2) = times.cell_of(j);
            let candidate = local_update(j1, j2, metrics.get(j1, j2), times, marks, |k| accepted[k]);
            if let Some(c) = candidate {
                if c.time < times.data[j] {
                    times.data[j] = c.time;
                    marks.data[j] = c.mark;
                    heap.push(Trial {
                        time: c.time,
                        index: j,
                    });
                }
            }
        }
    }
}
