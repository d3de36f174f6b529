//! Local anisotropic time update shared by the solvers.
//!
//! A cell's time is the minimum, over its 8 neighbours, of the time to reach it from
//! a solved neighbour (point update) or from anywhere on the edge joining two adjacent
//! solved neighbours, with time interpolated linearly along that edge. Step lengths
//! are measured with the inverse tensor `W = D^-1` of the cell being updated.
use glam::{Mat2, Vec2};

use crate::grid::Grid2;

/// Neighbour offsets in counter-clockwise order; even entries are axis neighbours.
pub(crate) const NEIGHBORS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Proposed time and mark for a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub time: f32,
    pub mark: usize,
}

/// Flat index of the neighbour of `(i1, i2)` at offset `(d1, d2)`, if inside the grid.
#[inline]
pub(crate) fn neighbor(
    i1: usize,
    i2: usize,
    (d1, d2): (isize, isize),
    n1: usize,
    n2: usize,
) -> Option<usize> {
    let j1 = i1.checked_add_signed(d1).filter(|&j| j < n1)?;
    let j2 = i2.checked_add_signed(d2).filter(|&j| j < n2)?;
    Some(j2 * n1 + j1)
}

#[inline]
fn length(w: Mat2, y: Vec2) -> f32 {
    y.dot(w * y).max(0.0).sqrt()
}

/// Minimum of `ta + s (tb - ta) + |pa + s (pb - pa)|_W` over `s` in `[0, 1]`.
///
/// `pa` and `pb` are the neighbour offsets. Returns the time and minimizing `s`.
pub(crate) fn edge_time(w: Mat2, pa: Vec2, pb: Vec2, ta: f32, tb: f32) -> (f32, f32) {
    let f = pb - pa;
    let dt = tb - ta;
    let g = |s: f32| ta + s * dt + length(w, pa + s * f);

    let mut best = (g(0.0), 0.0);
    let g1 = g(1.0);
    if g1 < best.0 {
        best = (g1, 1.0);
    }

    // Stationary point of g: with u = a s + b and |y|^2 = (u^2 + k) / a,
    // g'(s) = 0 gives u = -dt sqrt(k / (a - dt^2)).
    let wf = w * f;
    let a = f.dot(wf);
    let b = pa.dot(wf);
    let c = pa.dot(w * pa);
    let denom = a - dt * dt;
    if a > 0.0 && denom > 0.0 {
        let k = (a * c - b * b).max(0.0);
        let u = -dt * (k / denom).sqrt();
        let s = (u - b) / a;
        if s > 0.0 && s < 1.0 {
            let gs = g(s);
            if gs < best.0 {
                best = (gs, s);
            }
        }
    }
    best
}

/// Best candidate for cell `(i1, i2)` using only neighbours for which `usable` holds.
pub(crate) fn local_update(
    i1: usize,
    i2: usize,
    w: Mat2,
    times: &Grid2<f32>,
    marks: &Grid2<usize>,
    usable: impl Fn(usize) -> bool,
) -> Option<Candidate> {
    let (n1, n2) = times.shape();
    let mut solved = [None; 8];
    for (k, &d) in NEIGHBORS.iter().enumerate() {
        solved[k] = neighbor(i1, i2, d, n1, n2).filter(|&j| usable(j));
    }

    let offset = |k: usize| Vec2::new(NEIGHBORS[k].0 as f32, NEIGHBORS[k].1 as f32);
    let mut best: Option<Candidate> = None;
    let mut consider = |c: Candidate| {
        if best.is_none_or(|b| c.time < b.time) {
            best = Some(c);
        }
    };

    for k in 0..8 {
        let Some(ja) = solved[k] else { continue };
        let ta = times.data[ja];
        consider(Candidate {
            time: ta + length(w, offset(k)),
            mark: marks.data[ja],
        });

        let kb = (k + 1) % 8;
        let Some(jb) = solved[kb] else { continue };
        let tb = times.data[jb];
        let (time, s) = edge_time(w, offset(k), offset(kb), ta, tb);
        let mark = if s == 0.0 {
            marks.data[ja]
        } else if s == 1.0 {
            marks.data[jb]
        } else if ta < tb || (ta == tb && k % 2 == 0) {
            marks.data[ja]
        } else {
            marks.data[jb]
        };
        consider(Candidate { time, mark });
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn neighbor_stays_inside_grid() {
        assert_eq!(neighbor(0, 0, (-1, 0), 3, 3), None);
        assert_eq!(neighbor(2, 1, (1, 0), 3, 3), None);
        assert_eq!(neighbor(1, 1, (1, 1), 3, 3), Some(8));
    }

    #[test]
    fn edge_time_prefers_interior_point_for_equal_times() {
        // Both endpoints at time 0: the closest point of the edge x1 = 1 is (1, 0).
        let (t, s) = edge_time(
            Mat2::IDENTITY,
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            0.0,
            0.0,
        );
        approx_eq(t, 1.0);
        approx_eq(s, 0.5);
    }

    #[test]
    fn edge_time_recovers_plane_wave() {
        // Plane wave t = x1 through an axis and a diagonal neighbour.
        let (t, _) = edge_time(
            Mat2::IDENTITY,
            Vec2::new(-1.0, 0.0),
            Vec2::new(-1.0, 1.0),
            4.0,
            4.0,
        );
        approx_eq(t, 5.0);
    }

    #[test]
    fn point_update_uses_metric() {
        let mut times = Grid2::new(3, 1, f32::INFINITY);
        let mut marks = Grid2::new(3, 1, 0usize);
        times.set(0, 0, 0.0);
        marks.set(0, 0, 7);
        // Metric W = D^-1 with D = diag(4, 1): steps along axis 1 cost 1/2.
        let w = Mat2::from_diagonal(Vec2::new(0.25, 1.0));
        let c = local_update(1, 0, w, &times, &marks, |j| times.data[j].is_finite()).unwrap();
        approx_eq(c.time, 0.5);
        assert_eq!(c.mark, 7);
    }

    #[test]
    fn no_usable_neighbours_yields_none() {
        let times = Grid2::new(2, 2, f32::INFINITY);
        let marks = Grid2::new(2, 2, 0usize);
        assert!(local_update(0, 0, Mat2::IDENTITY, &times, &marks, |_| false).is_none());
    }
}
