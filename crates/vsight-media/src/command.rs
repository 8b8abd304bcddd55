//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// One FFmpeg invocation: a single input and a single output file.
///
/// Arguments pushed with `input_arg` land before `-i` and apply to the
/// demuxer (seeking, read limits); `output_arg` ones apply to the encoder.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    pre_input: Vec<String>,
    post_input: Vec<String>,
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            pre_input: Vec::new(),
            post_input: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Push a demuxer argument.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.pre_input.push(arg.into());
        self
    }

    /// Push an encoder argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.post_input.push(arg.into());
        self
    }

    /// Set seek position (before input, so FFmpeg seeks then decodes).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Limit how much of the input is read.
    pub fn duration(self, seconds: f64) -> Self {
        self.input_arg("-t").input_arg(format!("{:.3}", seconds))
    }

    /// Extract single frame.
    pub fn single_frame(self) -> Self {
        self.output_arg("-frames:v").output_arg("1")
    }

    /// Set JPEG quality from a 0.0-1.0 scale.
    pub fn jpeg_quality(self, quality: f32) -> Self {
        self.output_arg("-q:v")
            .output_arg(jpeg_qscale(quality).to_string())
    }

    /// Drop the video stream.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Downmix to the given channel count.
    pub fn audio_channels(self, channels: u16) -> Self {
        self.output_arg("-ac").output_arg(channels.to_string())
    }

    /// Resample audio.
    pub fn audio_rate(self, rate: u32) -> Self {
        self.output_arg("-ar").output_arg(rate.to_string())
    }

    /// Force the output container/format.
    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Full argument list, always overwriting the output.
    pub fn build_args(&self) -> Vec<String> {
        ["-y", "-v", self.log_level.as_str()]
            .into_iter()
            .map(str::to_string)
            .chain(self.pre_input.iter().cloned())
            .chain(["-i".to_string(), self.input.to_string_lossy().into_owned()])
            .chain(self.post_input.iter().cloned())
            .chain(std::iter::once(self.output.to_string_lossy().into_owned()))
            .collect()
    }
}

/// Map a 0.0-1.0 quality to the mjpeg qscale range (2 best, 31 worst).
fn jpeg_qscale(quality: f32) -> u8 {
    let quality = quality.clamp(0.0, 1.0);
    (2.0 + (1.0 - quality) * 29.0).round() as u8
}

/// Runner for FFmpeg commands with an optional timeout.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Set an optional timeout.
    pub fn with_timeout_opt(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Run an FFmpeg command to completion.
    ///
    /// The child process is killed if the timeout elapses or the future is dropped.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), child).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!("FFmpeg timed out after {} seconds, killing process", secs);
                    return Err(MediaError::Timeout(secs));
                }
            },
            None => child.await?,
        };

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                (!stderr.is_empty()).then_some(stderr),
                output.status.code(),
            ))
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}
