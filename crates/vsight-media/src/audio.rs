//! Audio track resampling.
//!
//! The audio track is decoded by FFmpeg in a single offline pass that
//! downmixes to mono, resamples to 16 kHz and stops after the configured
//! limit. Missing or broken audio is an expected outcome: every failure is
//! logged and turned into `None`.

use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::wav::{encode_wav_f32, CHANNELS, SAMPLE_RATE};
use vsight_models::AudioPayload;

/// Longest audio excerpt sent for analysis.
pub const MAX_AUDIO_SECONDS: f64 = 30.0;

/// Audio resampling configuration.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Truncation limit in seconds (never above 30)
    pub max_seconds: f64,
    /// FFmpeg timeout
    pub timeout_secs: Option<u64>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_seconds: MAX_AUDIO_SECONDS,
            timeout_secs: Some(120),
        }
    }
}

impl AudioConfig {
    fn limit_seconds(&self) -> f64 {
        self.max_seconds.clamp(0.0, MAX_AUDIO_SECONDS)
    }
}

/// Decode, resample and encode the audio track, or `None` if there is none.
pub async fn extract_audio(path: impl AsRef<Path>, config: &AudioConfig) -> Option<AudioPayload> {
    let path = path.as_ref();

    match try_extract_audio(path, config).await {
        Ok(payload) => {
            info!(
                path = %path.display(),
                samples = payload.sample_count(),
                seconds = payload.duration_seconds(),
                "Audio track resampled"
            );
            Some(payload)
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Audio track missing or corrupt. Proceeding with visual-only analysis."
            );
            None
        }
    }
}

async fn try_extract_audio(path: &Path, config: &AudioConfig) -> MediaResult<AudioPayload> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    // Deleted when dropped, whichever way this function returns
    let raw = NamedTempFile::new()?;

    decode_to_raw(path, raw.path(), config).await?;
    let samples = load_audio_samples(raw.path()).await?;

    payload_from_samples(&samples, config.limit_seconds())
}

/// Truncate decoded 16 kHz samples to `limit_secs` and pack them as WAV.
pub fn payload_from_samples(samples: &[f32], limit_secs: f64) -> MediaResult<AudioPayload> {
    if samples.is_empty() {
        return Err(MediaError::audio_decode("No audio samples decoded"));
    }

    let max_samples = (limit_secs.clamp(0.0, MAX_AUDIO_SECONDS) * SAMPLE_RATE as f64) as usize;
    let samples = &samples[..samples.len().min(max_samples)];

    Ok(AudioPayload::from_wav_bytes(encode_wav_f32(samples)?))
}

/// Render the audio track to raw mono 16 kHz f32le.
async fn decode_to_raw(input: &Path, output: &Path, config: &AudioConfig) -> MediaResult<()> {
    debug!(
        input = %input.display(),
        output = %output.display(),
        "Decoding audio track"
    );

    let cmd = FfmpegCommand::new(input, output)
        .duration(config.limit_seconds())
        .no_video()
        .audio_channels(CHANNELS)
        .audio_rate(SAMPLE_RATE)
        .format("f32le")
        .log_level("error");

    FfmpegRunner::new()
        .with_timeout_opt(config.timeout_secs)
        .run(&cmd)
        .await
        .map_err(|e| match e {
            MediaError::FfmpegFailed { stderr, .. } => MediaError::audio_decode(
                stderr.unwrap_or_else(|| "FFmpeg could not decode the audio track".into()),
            ),
            other => other,
        })
}

/// Load raw f32le audio samples from a file.
async fn load_audio_samples(path: &Path) -> MediaResult<Vec<f32>> {
    let bytes = tokio::fs::read(path).await?;
    Ok(samples_from_f32le(&bytes))
}

fn samples_from_f32le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
