#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for forensic media sampling.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeouts
//! - FFprobe metadata loading
//! - Evenly spaced JPEG frame sampling with strictly sequential seeks
//! - Audio decoding to mono 16 kHz PCM wrapped in a RIFF/WAVE container
//! - A `MediaSource` seam so callers can substitute the media backend

pub mod audio;
pub mod command;
pub mod error;
pub mod frames;
pub mod probe;
pub mod source;
pub mod wav;

pub use audio::{extract_audio, payload_from_samples, AudioConfig};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frames::{sample_frames, FrameSamplerConfig, SampledVideo};
pub use probe::{probe_video, VideoInfo};
pub use source::{FfmpegMediaSource, MediaSource};
pub use wav::{decode_wav, encode_wav, WavInfo};
