//! Hand skeleton geometry and gesture classification
//!
//! Turns one hand's 21 normalized landmarks into a discrete [`GestureLabel`].

pub mod classifier;
pub mod geometry;
pub mod landmarks;

pub use classifier::{classify, ClassifierThresholds, GestureClassifier, GestureLabel, HandMetrics};
pub use landmarks::{Hand, Landmark, LANDMARK_COUNT};
