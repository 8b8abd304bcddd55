//! Sampled video frames.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// A single JPEG still captured from the source video.
///
/// Frames are produced by the frame sampler and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFrame {
    /// JPEG-encoded image
    #[serde(with = "crate::encoding::base64_bytes", rename = "base64")]
    pub image_bytes: Vec<u8>,
    /// Position of the frame in the source, in seconds
    #[serde(rename = "timestamp")]
    pub timestamp_seconds: f64,
}

impl MediaFrame {
    /// Create a new frame.
    pub fn new(image_bytes: Vec<u8>, timestamp_seconds: f64) -> Self {
        Self {
            image_bytes,
            timestamp_seconds,
        }
    }

    /// Base64 text of the JPEG bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.image_bytes)
    }

    /// Size of the encoded image in bytes.
    pub fn len(&self) -> usize {
        self.image_bytes.len()
    }

    /// True if the frame carries no image data.
    pub fn is_empty(&self) -> bool {
        self.image_bytes.is_empty()
    }
}

/// Timestamp of the last frame, or 0 when nothing was sampled.
pub fn last_timestamp(frames: &[MediaFrame]) -> f64 {
    frames.last().map(|f| f.timestamp_seconds).unwrap_or(0.0)
}
