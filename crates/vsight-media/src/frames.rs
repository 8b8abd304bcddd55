//! Evenly spaced frame sampling.
//!
//! A `FrameCursor` owns the decode scratch space and yields one frame per
//! `next_frame` call. Taking `&mut self` keeps seeks strictly sequential: the
//! next seek cannot begin until the previous capture has been awaited.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_video, VideoInfo};
use vsight_models::MediaFrame;

/// Default cap on sampled frames.
pub const DEFAULT_MAX_FRAMES: usize = 8;

/// Frame sampling configuration.
#[derive(Debug, Clone)]
pub struct FrameSamplerConfig {
    /// Maximum number of frames to capture
    pub max_frames: usize,
    /// Nominal divisor applied to the duration to get the step
    pub sample_divisor: f64,
    /// Smallest allowed step between captures (seconds)
    pub min_step_seconds: f64,
    /// JPEG quality (0.0-1.0)
    pub jpeg_quality: f32,
    /// Per-capture FFmpeg timeout
    pub timeout_secs: Option<u64>,
}

impl Default for FrameSamplerConfig {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
            sample_divisor: 3.0,
            min_step_seconds: 0.5,
            jpeg_quality: 0.8,
            timeout_secs: Some(60),
        }
    }
}

impl FrameSamplerConfig {
    /// Step between consecutive captures for a clip of `duration` seconds.
    pub fn step_for(&self, duration: f64) -> f64 {
        let nominal = if self.sample_divisor > 0.0 {
            duration / self.sample_divisor
        } else {
            duration
        };
        nominal.max(self.min_step_seconds)
    }

    /// Capture timestamps for a clip of `duration` seconds.
    ///
    /// Always starts at 0, so zero-length media still yields one timestamp.
    pub fn timestamps(&self, duration: f64) -> Vec<f64> {
        let step = self.step_for(duration);
        let mut timestamps = Vec::with_capacity(self.max_frames);
        let mut t = 0.0;

        while timestamps.len() < self.max_frames {
            if t >= duration && !timestamps.is_empty() {
                break;
            }
            timestamps.push(t);
            t += step;
        }

        timestamps
    }
}

/// Frames sampled from one video plus the probed metadata.
#[derive(Debug, Clone)]
pub struct SampledVideo {
    pub info: VideoInfo,
    pub frames: Vec<MediaFrame>,
}

impl SampledVideo {
    pub fn resolution_label(&self) -> Option<String> {
        self.info.resolution_label()
    }
}

/// Sequential frame reader over a single input file.
pub struct FrameCursor {
    input: PathBuf,
    timestamps: std::vec::IntoIter<f64>,
    captured: usize,
    quality: f32,
    runner: FfmpegRunner,
    // Removed on drop, on every exit path
    scratch: TempDir,
}

impl FrameCursor {
    /// Open a cursor for `input` with a precomputed schedule.
    pub fn open(
        input: impl AsRef<Path>,
        info: &VideoInfo,
        config: &FrameSamplerConfig,
    ) -> MediaResult<Self> {
        let scratch = tempfile::Builder::new().prefix("vsight-frames-").tempdir()?;

        Ok(Self {
            input: input.as_ref().to_path_buf(),
            timestamps: config.timestamps(info.duration).into_iter(),
            captured: 0,
            quality: config.jpeg_quality,
            runner: FfmpegRunner::new().with_timeout_opt(config.timeout_secs),
            scratch,
        })
    }

    /// Seek to the next scheduled timestamp and capture it.
    ///
    /// Returns `Ok(None)` once the schedule is exhausted or the decoder runs
    /// out of frames before the schedule does.
    pub async fn next_frame(&mut self) -> MediaResult<Option<MediaFrame>> {
        let Some(timestamp) = self.timestamps.next() else {
            return Ok(None);
        };

        let output = self
            .scratch
            .path()
            .join(format!("frame_{:02}.jpg", self.captured));

        let cmd = FfmpegCommand::new(&self.input, &output)
            .seek(timestamp)
            .single_frame()
            .jpeg_quality(self.quality)
            .log_level("error");

        let first = self.captured == 0;

        match self.runner.run(&cmd).await {
            Ok(()) => {}
            Err(e @ (MediaError::FfmpegNotFound | MediaError::Timeout(_))) => return Err(e),
            Err(e) if first => return Err(MediaError::media_load(e.to_string())),
            Err(e) => {
                warn!(timestamp, error = %e, "Frame capture failed, stopping early");
                self.exhaust();
                return Ok(None);
            }
        }

        let bytes = match tokio::fs::read(&output).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            _ if first => {
                return Err(MediaError::media_load("Decoder produced no frame at t=0"));
            }
            _ => {
                debug!(timestamp, "No frame decoded past this point");
                self.exhaust();
                return Ok(None);
            }
        };

        // Scratch file is no longer needed once read
        let _ = tokio::fs::remove_file(&output).await;

        self.captured += 1;
        Ok(Some(MediaFrame::new(bytes, timestamp)))
    }

    fn exhaust(&mut self) {
        self.timestamps = Vec::new().into_iter();
    }
}

/// Probe a video and sample frames evenly across its duration.
pub async fn sample_frames(
    path: impl AsRef<Path>,
    config: &FrameSamplerConfig,
) -> MediaResult<SampledVideo> {
    let path = path.as_ref();

    let info = probe_video(path).await.map_err(|e| match e {
        e if e.is_environment() => e,
        MediaError::MediaLoad(msg) => MediaError::MediaLoad(msg),
        other => MediaError::media_load(other.to_string()),
    })?;

    debug!(
        path = %path.display(),
        duration = info.duration,
        width = info.width,
        height = info.height,
        "Loaded video metadata"
    );

    let mut cursor = FrameCursor::open(path, &info, config)?;
    let mut frames = Vec::with_capacity(config.max_frames);

    while let Some(frame) = cursor.next_frame().await? {
        frames.push(frame);
    }

    info!(
        path = %path.display(),
        frames = frames.len(),
        duration = info.duration,
        "Frame sampling complete"
    );

    Ok(SampledVideo { info, frames })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_short_clip_uses_min_step() {
        let config = FrameSamplerConfig::default();
        // 1.2s / 3 = 0.4 -> clamped to 0.5
        let ts = config.timestamps(1.2);
        assert_eq!(ts, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_timestamps_long_clip_divides_duration() {
        let config = FrameSamplerConfig::default();
        let ts = config.timestamps(12.0);
        assert_eq!(ts, vec![0.0, 4.0, 8.0]);
    }

    #[test]
    fn test_timestamps_capped_at_max_frames() {
        let config = FrameSamplerConfig {
            sample_divisor: 100.0,
            ..Default::default()
        };
        let ts = config.timestamps(60.0);
        assert_eq!(ts.len(), DEFAULT_MAX_FRAMES);
    }

    #[test]
    fn test_zero_duration_yields_one_frame() {
        let config = FrameSamplerConfig::default();
        assert_eq!(config.timestamps(0.0), vec![0.0]);
    }

    #[test]
    fn test_timestamps_increasing_and_bounded() {
        let config = FrameSamplerConfig::default();
        for tenths in 0..600 {
            let duration = tenths as f64 / 10.0;
            let ts = config.timestamps(duration);
            assert!(!ts.is_empty() && ts.len() <= DEFAULT_MAX_FRAMES);
            assert!(ts.windows(2).all(|w| w[0] < w[1]));
            assert!(ts.iter().all(|t| *t <= duration));
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error() {
        let result = sample_frames("/nonexistent/clip.mp4", &FrameSamplerConfig::default()).await;
        match result {
            Err(MediaError::MediaLoad(_)) | Err(MediaError::FfprobeNotFound) => {}
            other => panic!("unexpected result: {:?}", other.map(|v| v.frames.len())),
        }
    }
}
