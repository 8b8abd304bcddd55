//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    /// The video container could not be read. Fatal to the run.
    #[error("Unable to load media: {0}")]
    MediaLoad(String),

    /// The audio track could not be decoded. Absorbed by the resampler.
    #[error("Audio decode failed: {0}")]
    AudioDecode(String),

    #[error("Invalid WAV data: {0}")]
    InvalidWav(String),

    #[error("WAV codec error: {0}")]
    Wav(#[from] hound::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a media load error.
    pub fn media_load(message: impl Into<String>) -> Self {
        Self::MediaLoad(message.into())
    }

    /// Create an audio decode error.
    pub fn audio_decode(message: impl Into<String>) -> Self {
        Self::AudioDecode(message.into())
    }

    /// True if the failure comes from a missing tool rather than the input.
    pub fn is_environment(&self) -> bool {
        matches!(self, Self::FfmpegNotFound | Self::FfprobeNotFound)
    }
}
