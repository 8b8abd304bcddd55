//! Encoded audio payloads.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// WAV header length for the canonical 16-bit mono layout.
pub const WAV_HEADER_LEN: usize = 44;

/// Sample rate of every payload produced by the resampler.
pub const PAYLOAD_SAMPLE_RATE: u32 = 16_000;

/// A mono 16 kHz 16-bit PCM RIFF/WAVE file, at most 30 seconds long.
///
/// A run without usable audio carries `Option::<AudioPayload>::None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioPayload {
    #[serde(with = "crate::encoding::base64_bytes")]
    wav_bytes: Vec<u8>,
}

impl AudioPayload {
    /// Wrap an already encoded WAV file.
    pub fn from_wav_bytes(wav_bytes: Vec<u8>) -> Self {
        Self { wav_bytes }
    }

    /// Raw WAV file bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.wav_bytes
    }

    /// Base64 text suitable for JSON transport.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.wav_bytes)
    }

    /// Number of 16-bit samples in the data chunk.
    pub fn sample_count(&self) -> usize {
        self.wav_bytes.len().saturating_sub(WAV_HEADER_LEN) / 2
    }

    /// Duration of the payload in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.sample_count() as f64 / PAYLOAD_SAMPLE_RATE as f64
    }
}
