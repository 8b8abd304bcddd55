//! Media backend seam used by the workflow controller.

use async_trait::async_trait;
use std::path::Path;

use crate::audio::{extract_audio, AudioConfig};
use crate::error::MediaResult;
use crate::frames::{sample_frames, FrameSamplerConfig, SampledVideo};
use vsight_models::AudioPayload;

/// Source of frames and audio for a selected file.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Sample frames; fails only if the video track is unusable.
    async fn sample_frames(&self, path: &Path) -> MediaResult<SampledVideo>;

    /// Resample the audio track; never fails.
    async fn extract_audio(&self, path: &Path) -> Option<AudioPayload>;
}

/// FFmpeg-backed media source.
#[derive(Debug, Clone, Default)]
pub struct FfmpegMediaSource {
    pub frames: FrameSamplerConfig,
    pub audio: AudioConfig,
}

impl FfmpegMediaSource {
    pub fn new(frames: FrameSamplerConfig, audio: AudioConfig) -> Self {
        Self { frames, audio }
    }
}

#[async_trait]
impl MediaSource for FfmpegMediaSource {
    async fn sample_frames(&self, path: &Path) -> MediaResult<SampledVideo> {
        sample_frames(path, &self.frames).await
    }

    async fn extract_audio(&self, path: &Path) -> Option<AudioPayload> {
        extract_audio(path, &self.audio).await
    }
}
