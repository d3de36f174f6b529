//! Nearest-neighbor stage: marking known samples, solving times, adjusting them.
use std::time::Instant;

use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::Grid2;
use crate::gridder::config::GridderConfig;
use crate::marker::TimeMarker;
use crate::tensors::Tensors2;

/// Smallest positive `f32`, the floor for adjusted times of unknown cells.
const TIME_FLOOR: f32 = f32::from_bits(1);

/// Output of the nearest-neighbor stage besides the updated times and values.
#[derive(Clone, Debug)]
pub(crate) struct NearestOutcome {
    pub marks: Grid2<usize>,
    pub seconds: f64,
}

/// Compute nearest-neighbor values and times in place.
///
/// Cells with zero time are known and already hold their value in `values`.
pub(crate) fn grid_nearest(
    config: &GridderConfig,
    tensors: &dyn Tensors2,
    times: &mut Grid2<f32>,
    values: &mut Grid2<f32>,
) -> Result<NearestOutcome> {
    times.ensure_same_shape(values, "values")?;
    let (n1, n2) = times.shape();

    // Marks index the values of known samples in raster order.
    let mut known_values = Vec::new();
    let mut marks = Grid2::new(n1, n2, 0usize);
    for (i, &t) in times.data.iter().enumerate() {
        if t == 0.0 {
            marks.data[i] = known_values.len();
            known_values.push(values.data[i]);
        }
    }
    let nmark = known_values.len();
    if nmark == 0 {
        return Err(Error::InvalidState("no known samples to grid".into()));
    }
    debug!("Gridding {}x{} cells with {} known samples.", n1, n2, nmark);

    let marker = TimeMarker::new(n1, n2, tensors, config.time_solver)?;
    let start = Instant::now();
    marker.apply(times, &mut marks)?;
    let seconds = start.elapsed().as_secs_f64();
    debug!("{:?} time solver took {:.6}s.", config.time_solver, seconds);

    adjust_times(nmark, &marks, times);

    for (i, t) in times.data.iter_mut().enumerate() {
        if *t != 0.0 {
            values.data[i] = known_values[marks.data[i]];
        }
        if *t > config.time_max {
            *t = config.time_max;
        }
    }

    Ok(NearestOutcome { marks, seconds })
}

/// Shift times so that they are nearly zero next to known samples.
///
/// The first update away from a known sample leaves a finite time on its neighbours.
/// For each known sample, the largest time among its 8 neighbours (edges replicated)
/// is subtracted from every cell marked with that sample, without reaching zero.
/// Adjusted times never fall below the smallest positive subnormal value.
pub(crate) fn adjust_times(nmark: usize, marks: &Grid2<usize>, times: &mut Grid2<f32>) {
    let (n1, n2) = times.shape();
    let mut offsets = vec![0.0f32; nmark];
    for i2 in 0..n2 {
        let i2m = i2.saturating_sub(1);
        let i2p = (i2 + 1).min(n2 - 1);
        for i1 in 0..n1 {
            if times.get(i1, i2) != 0.0 {
                continue;
            }
            let i1m = i1.saturating_sub(1);
            let i1p = (i1 + 1).min(n1 - 1);
            let tmax = [
                (i1m, i2m),
                (i1, i2m),
                (i1p, i2m),
                (i1m, i2),
                (i1p, i2),
                (i1m, i2p),
                (i1, i2p),
                (i1p, i2p),
            ]
            .iter()
            .fold(0.0f32, |m, &(j1, j2)| m.max(times.get(j1, j2)));
            offsets[marks.get(i1, i2)] = tmax;
        }
    }

    for (t, &m) in times.data.iter_mut().zip(&marks.data) {
        if *t > 0.0 {
            *t = (*t - offsets[m]).max(TIME_FLOOR);
        }
    }
}
