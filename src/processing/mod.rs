//! Per-frame signal processing applied before events are dispatched
//!
//! Currently a moving-average cursor smoother fed by the tracked wrist.

pub mod cursor_smoothing;

pub use cursor_smoothing::{CursorPoint, CursorSmoother, DEFAULT_HISTORY_LENGTH};
