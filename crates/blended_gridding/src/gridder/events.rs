//! Event types and sinks for observing gridding runs.
//!
//! [`crate::gridder::BlendedGridder::grid_with_events`] reports the progress of each
//! stage as a [`GridEvent`] to any [`EventSink`].
use crate::marker::TimeSolverKind;

/// Describes events emitted while gridding.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Scattered samples were placed on the grid.
    Rasterized {
        /// Grid shape `(n1, n2)`.
        shape: (usize, usize),
        /// Number of cells holding a known value.
        known: usize,
    },

    /// Times and marks were computed.
    TimesSolved {
        solver: TimeSolverKind,
        /// Wall-clock time spent in the solver.
        seconds: f64,
    },

    /// The nearest-neighbor field is complete.
    NearestFinished,

    /// Blending finished.
    BlendingFinished {
        /// Mean of the nearest-neighbor field removed before smoothing.
        mean: f32,
    },

    /// Non-fatal warning.
    Warning { message: String },
}

/// A generic event sink that accepts [`GridEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: GridEvent);
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: GridEvent) {}
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(GridEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(GridEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(GridEvent),
{
    #[inline]
    fn send(&mut self, event: GridEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<GridEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<GridEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[GridEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: GridEvent) {
        self.events.push(event);
    }
}
