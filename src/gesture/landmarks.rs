//! Hand skeleton types
//!
//! Landmarks are normalized to the camera frame (`x`, `y` in `[0, 1]`).
//! Indices follow the 21-point hand landmark convention.

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// A single normalized 2D joint position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scale into pixel space, truncating toward zero
    pub fn to_pixels(&self, width: u32, height: u32) -> (i32, i32) {
        (
            (self.x * width as f64) as i32,
            (self.y * height as f64) as i32,
        )
    }
}

impl From<(f64, f64)> for Landmark {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// One tracked hand: always exactly 21 landmarks
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl Hand {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn wrist(&self) -> Landmark {
        self.landmarks[WRIST]
    }

    /// All landmarks in pixel space of a `width` x `height` image
    pub fn to_pixels(&self, width: u32, height: u32) -> Vec<(i32, i32)> {
        self.landmarks
            .iter()
            .map(|lm| lm.to_pixels(width, height))
            .collect()
    }
}

impl TryFrom<Vec<Landmark>> for Hand {
    type Error = RelayError;

    fn try_from(points: Vec<Landmark>) -> RelayResult<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into().map_err(|v: Vec<Landmark>| {
            RelayError::InvalidFrame(format!(
                "expected {} landmarks, got {}",
                LANDMARK_COUNT,
                v.len()
            ))
        })?;
        Ok(Self { landmarks })
    }
}

impl std::ops::Index<usize> for Hand {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }
}
