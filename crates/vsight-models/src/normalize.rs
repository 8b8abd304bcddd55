//! Deterministic post-processing of raw analysis responses.
//!
//! The remote model's aggregate score is never trusted on its own: any FAIL
//! finding caps the score at 40 and forces a non-authentic, high-confidence
//! verdict; two or more WARN findings cap it at 60 and force non-authentic.
//! The clamps are monotonic, so normalizing twice yields the same report.

use thiserror::Error;

use crate::frame::{last_timestamp, MediaFrame};
use crate::report::{
    AnomalyFinding, ConfidenceLevel, FindingStatus, ForensicReport, RawAnalysis, ReportMetadata,
};

/// Resolution label used when the source dimensions are unknown.
pub const DEFAULT_RESOLUTION_LABEL: &str = "1080p (Est)";

/// Score ceiling when any vector failed.
pub const FAIL_SCORE_CAP: u8 = 40;

/// Score ceiling when two or more vectors warned.
pub const WARN_SCORE_CAP: u8 = 60;

/// Number of WARN findings that triggers the warning cap.
pub const WARN_THRESHOLD: usize = 2;

/// Errors raised while normalizing a response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("Response is missing the analysis array")]
    MissingAnalysis,
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Normalize a raw response with the default resolution label.
pub fn normalize(
    raw: RawAnalysis,
    frames: &[MediaFrame],
    audio_present: bool,
) -> ReportResult<ForensicReport> {
    normalize_with_resolution(raw, frames, audio_present, None)
}

/// Normalize a raw response, labelling the resolution when it is known.
pub fn normalize_with_resolution(
    raw: RawAnalysis,
    frames: &[MediaFrame],
    audio_present: bool,
    resolution_label: Option<&str>,
) -> ReportResult<ForensicReport> {
    let analysis = raw.analysis.ok_or(ReportError::MissingAnalysis)?;
    let verdict = apply_policy(
        &analysis,
        raw.is_authentic,
        raw.score,
        raw.confidence_level,
    );

    Ok(ForensicReport {
        is_authentic: verdict.is_authentic,
        score: verdict.score,
        summary: raw.summary.unwrap_or_default(),
        confidence_level: verdict.confidence_level,
        analysis: analysis.into_iter().map(clamp_confidence).collect(),
        metadata: ReportMetadata {
            duration_seconds: last_timestamp(frames),
            resolution_label: resolution_label
                .unwrap_or(DEFAULT_RESOLUTION_LABEL)
                .to_string(),
            frames_processed: frames.len(),
            audio_processed: audio_present,
        },
    })
}

impl ForensicReport {
    /// Re-apply the override rules, keeping metadata untouched.
    pub fn renormalize(&self) -> ForensicReport {
        let verdict = apply_policy(
            &self.analysis,
            Some(self.is_authentic),
            Some(self.score as f64),
            Some(self.confidence_level),
        );

        ForensicReport {
            is_authentic: verdict.is_authentic,
            score: verdict.score,
            confidence_level: verdict.confidence_level,
            ..self.clone()
        }
    }
}

struct Verdict {
    is_authentic: bool,
    score: u8,
    confidence_level: ConfidenceLevel,
}

fn apply_policy(
    analysis: &[AnomalyFinding],
    is_authentic: Option<bool>,
    score: Option<f64>,
    confidence_level: Option<ConfidenceLevel>,
) -> Verdict {
    let fail_count = analysis
        .iter()
        .filter(|a| a.status == FindingStatus::Fail)
        .count();
    let warn_count = analysis
        .iter()
        .filter(|a| a.status == FindingStatus::Warn)
        .count();

    let score = clamp_score(score);
    let confidence_level = confidence_level.unwrap_or_default();

    if fail_count > 0 {
        Verdict {
            is_authentic: false,
            score: score.min(FAIL_SCORE_CAP),
            confidence_level: ConfidenceLevel::High,
        }
    } else if warn_count >= WARN_THRESHOLD {
        Verdict {
            is_authentic: false,
            score: score.min(WARN_SCORE_CAP),
            confidence_level,
        }
    } else {
        Verdict {
            is_authentic: is_authentic.unwrap_or(false),
            score,
            confidence_level,
        }
    }
}

fn clamp_score(score: Option<f64>) -> u8 {
    match score {
        Some(s) if s.is_finite() => s.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

fn clamp_confidence(mut finding: AnomalyFinding) -> AnomalyFinding {
    finding.confidence = if finding.confidence.is_finite() {
        finding.confidence.clamp(0.0, 100.0)
    } else {
        0.0
    };
    finding
}
