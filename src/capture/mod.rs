//! Capture-side collaborators
//!
//! The relay never touches a camera or a landmark model directly. It consumes
//! observations through [`HandTracker`] and re-encodes frames through
//! [`FrameEncoder`].

pub mod encoder;
pub mod subprocess;
pub mod traits;

// Re-export traits
pub use traits::{CapturedImage, FrameEncoder, FrameObservation, HandTracker, Resolution};

pub use encoder::JpegResizer;
pub use subprocess::{FeedTracker, SubprocessTracker};
