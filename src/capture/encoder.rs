//! JPEG frame resizing
//!
//! The tracker process hands over JPEG bytes at camera resolution. Before a
//! frame goes on the wire it is scaled to whatever size the consumer last
//! asked for.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::capture::traits::{CapturedImage, FrameEncoder, Resolution};
use crate::error::{RelayError, RelayResult};

/// Default JPEG quality for outbound frames
pub const DEFAULT_JPEG_QUALITY: u8 = 40;

pub struct JpegResizer {
    quality: u8,
}

impl JpegResizer {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegResizer {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameEncoder for JpegResizer {
    fn encode(&self, image: &CapturedImage, target: Resolution) -> RelayResult<Vec<u8>> {
        if image.data.is_empty() {
            return Err(RelayError::Encoding("Captured image is empty".to_string()));
        }
        if target.is_empty() {
            return Err(RelayError::Encoding(format!("Invalid target size {}", target)));
        }
        if image.width == target.width && image.height == target.height {
            return Ok(image.data.clone());
        }

        let decoded = image::load_from_memory(&image.data)
            .map_err(|e| RelayError::Encoding(format!("Failed to decode capture: {}", e)))?;
        let resized = decoded
            .resize_exact(target.width, target.height, FilterType::Triangle)
            .to_rgb8();

        let mut out = Vec::with_capacity(image.data.len());
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .encode_image(&resized)
            .map_err(|e| RelayError::Encoding(format!("Failed to encode frame: {}", e)))?;
        Ok(out)
    }
}
