//! Wire types for the analysis request.

use serde::{Deserialize, Serialize};
use vsight_models::{AudioPayload, MediaFrame};

/// Payload submitted to the analysis service.
///
/// Only even-indexed frames (0, 2, 4, ...) are carried to halve bandwidth
/// and quota use. Serializes as `{ frames: [{base64, timestamp}], audioBase64 }`
/// with `audioBase64` null when no audio was extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub frames: Vec<MediaFrame>,
    pub audio_base64: Option<AudioPayload>,
}

impl AnalysisRequest {
    /// Build a request from the full sampled frame list.
    pub fn new(frames: &[MediaFrame], audio: Option<&AudioPayload>) -> Self {
        Self {
            frames: frames.iter().step_by(2).cloned().collect(),
            audio_base64: audio.cloned(),
        }
    }

    /// Number of frames actually sent for analysis.
    pub fn frames_sent(&self) -> usize {
        self.frames.len()
    }

    pub fn has_audio(&self) -> bool {
        self.audio_base64.is_some()
    }
}
