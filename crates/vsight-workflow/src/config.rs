//! Pipeline configuration.

use std::path::PathBuf;

use vsight_analysis::AnalysisConfig;
use vsight_media::{AudioConfig, FrameSamplerConfig};

use crate::error::WorkflowResult;

/// Operator label used when none is configured.
pub const DEFAULT_OPERATOR: &str = "UNKNOWN";

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub analysis: AnalysisConfig,
    pub frames: FrameSamplerConfig,
    pub audio: AudioConfig,
    /// Directory dossiers are written to
    pub export_dir: PathBuf,
    /// Operator label stamped on dossiers
    pub operator_id: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            frames: FrameSamplerConfig::default(),
            audio: AudioConfig::default(),
            export_dir: PathBuf::from("."),
            operator_id: DEFAULT_OPERATOR.to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkflowResult<Self> {
        let defaults = Self::default();
        let ffmpeg_timeout = std::env::var("VSIGHT_FFMPEG_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());

        let frames = FrameSamplerConfig {
            max_frames: std::env::var("VSIGHT_MAX_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.frames.max_frames),
            sample_divisor: std::env::var("VSIGHT_SAMPLE_DIVISOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|d: &f64| *d > 0.0)
                .unwrap_or(defaults.frames.sample_divisor),
            jpeg_quality: std::env::var("VSIGHT_JPEG_QUALITY")
                .ok()
                .and_then(|s| parse_jpeg_quality(&s))
                .unwrap_or(defaults.frames.jpeg_quality),
            timeout_secs: ffmpeg_timeout.or(defaults.frames.timeout_secs),
            ..defaults.frames
        };

        let audio = AudioConfig {
            max_seconds: std::env::var("VSIGHT_AUDIO_MAX_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs: &f64| secs.is_finite())
                .unwrap_or(defaults.audio.max_seconds),
            timeout_secs: ffmpeg_timeout.or(defaults.audio.timeout_secs),
        };

        Ok(Self {
            analysis: AnalysisConfig::from_env()?,
            frames,
            audio,
            export_dir: std::env::var("VSIGHT_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            operator_id: std::env::var("VSIGHT_OPERATOR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.operator_id),
        })
    }
}

/// Parse a JPEG quality in [0, 1]. Non-numeric and non-finite values are rejected.
fn parse_jpeg_quality(value: &str) -> Option<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|q| q.is_finite())
        .map(|q| q.clamp(0.0, 1.0))
}
