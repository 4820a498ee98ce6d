//! Moving-average cursor smoothing
//!
//! Raw pointer positions derived from the tracked wrist jitter from frame to
//! frame. The smoother keeps the last few positions and reports their mean,
//! trading a few frames of latency for a steady cursor.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of frames averaged by default
pub const DEFAULT_HISTORY_LENGTH: usize = 5;

/// A pointer position in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CursorPoint {
    pub x: f64,
    pub y: f64,
}

impl CursorPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Integer screen coordinates, truncated toward zero
    pub fn to_screen(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// Bounded FIFO of recent raw positions
#[derive(Debug, Clone)]
pub struct CursorSmoother {
    history: VecDeque<CursorPoint>,
    capacity: usize,
}

impl CursorSmoother {
    /// `capacity` is clamped to at least one sample
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record a raw position and return the mean of the retained history
    pub fn push(&mut self, point: CursorPoint) -> CursorPoint {
        self.history.push_back(point);
        if self.history.len() > self.capacity {
            self.history.pop_front();
        }

        let count = self.history.len() as f64;
        let (sum_x, sum_y) = self
            .history
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        CursorPoint::new(sum_x / count, sum_y / count)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CursorSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LENGTH)
    }
}
