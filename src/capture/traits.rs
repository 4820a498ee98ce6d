//! Capture-side collaborator interfaces
//!
//! Defines what the relay needs from the outside world: a source of hand
//! observations and an image encoder that produces the compressed frame at the
//! currently requested size.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RelayResult;
use crate::gesture::Hand;

/// A width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Image as delivered by the capture source
#[derive(Debug, Clone, Default)]
pub struct CapturedImage {
    /// Encoded image bytes (JPEG from the tracker process)
    pub data: Vec<u8>,

    /// Capture width in pixels
    pub width: u32,

    /// Capture height in pixels
    pub height: u32,
}

/// Everything detected in one capture
#[derive(Debug, Clone, Default)]
pub struct FrameObservation {
    /// Detected hands, in tracker order; only the first one drives gestures
    pub hands: Vec<Hand>,

    pub image: CapturedImage,
}

impl FrameObservation {
    pub fn primary_hand(&self) -> Option<&Hand> {
        self.hands.first()
    }

    pub fn capture_size(&self) -> Resolution {
        Resolution::new(self.image.width, self.image.height)
    }
}

/// Source of hand observations
///
/// `Ok(None)` means the capture was dropped and the caller should simply
/// try again; an error ends the session.
#[async_trait]
pub trait HandTracker: Send {
    async fn next_observation(&mut self) -> RelayResult<Option<FrameObservation>>;
}

/// Produces the outbound compressed image at `target` size
///
/// Called from a blocking worker thread, hence `Sync + 'static`.
pub trait FrameEncoder: Send + Sync + 'static {
    fn encode(&self, image: &CapturedImage, target: Resolution) -> RelayResult<Vec<u8>>;
}
