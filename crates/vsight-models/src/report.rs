//! Forensic report models.
//!
//! `RawAnalysis` mirrors what the remote analysis service returns, with every
//! field optional so that missing data can be rejected or defaulted by the
//! normalizer. `ForensicReport` is the normalized, policy-compliant result.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Verdict of a single detection vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FindingStatus {
    Pass,
    Warn,
    Fail,
}

impl FindingStatus {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }

    /// True for WARN and FAIL.
    pub fn is_anomaly(&self) -> bool {
        !matches!(self, Self::Pass)
    }
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How sure the analysis is of its overall verdict.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    #[default]
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detection vector's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnomalyFinding {
    /// Detection vector label, e.g. "Lip-Sync"
    #[serde(default)]
    pub category: String,
    /// Confidence in percent (0-100)
    #[serde(default)]
    pub confidence: f64,
    /// Technical observation
    #[serde(default)]
    pub detail: String,
    pub status: FindingStatus,
}

impl AnomalyFinding {
    pub fn new(
        category: impl Into<String>,
        confidence: f64,
        detail: impl Into<String>,
        status: FindingStatus,
    ) -> Self {
        Self {
            category: category.into(),
            confidence,
            detail: detail.into(),
            status,
        }
    }
}

/// Analysis result exactly as returned by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    #[serde(default)]
    pub is_authentic: Option<bool>,
    /// Integrity score; may arrive fractional or out of range
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub confidence_level: Option<ConfidenceLevel>,
    #[serde(default)]
    pub analysis: Option<Vec<AnomalyFinding>>,
}

/// Facts about the sampled input attached to every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Timestamp of the last sampled frame
    pub duration_seconds: f64,
    /// Best-effort resolution label, e.g. "1080p (Est)"
    #[serde(rename = "resolution")]
    pub resolution_label: String,
    /// Number of frames sampled (not only those sent)
    pub frames_processed: usize,
    pub audio_processed: bool,
}

/// Normalized forensic report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForensicReport {
    pub is_authentic: bool,
    /// Integrity score (0-100)
    pub score: u8,
    pub summary: String,
    pub confidence_level: ConfidenceLevel,
    pub analysis: Vec<AnomalyFinding>,
    pub metadata: ReportMetadata,
}

impl ForensicReport {
    /// Number of findings with the given status.
    pub fn count_status(&self, status: FindingStatus) -> usize {
        self.analysis.iter().filter(|a| a.status == status).count()
    }

    /// Number of findings that are not PASS.
    pub fn anomaly_count(&self) -> usize {
        self.analysis.iter().filter(|a| a.status.is_anomaly()).count()
    }

    /// Headline verdict used on screen and in the dossier.
    pub fn verdict_label(&self) -> &'static str {
        if self.is_authentic {
            "AUTHENTIC MEDIA"
        } else {
            "MANIPULATION DETECTED"
        }
    }

    /// Findings arranged in canonical detection-vector order.
    pub fn aligned_findings(&self) -> Vec<AnomalyFinding> {
        crate::vectors::align_findings(&self.analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_analysis_parses_service_shape() {
        let json = r#"{
            "isAuthentic": true,
            "score": 87.5,
            "summary": "Consistent lighting",
            "confidenceLevel": "MEDIUM",
            "analysis": [
                {"category": "Lip-Sync", "confidence": 91, "detail": "aligned", "status": "PASS"}
            ]
        }"#;

        let raw: RawAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(raw.is_authentic, Some(true));
        assert_eq!(raw.score, Some(87.5));
        assert_eq!(raw.confidence_level, Some(ConfidenceLevel::Medium));
        assert_eq!(raw.analysis.unwrap()[0].status, FindingStatus::Pass);
    }

    #[test]
    fn test_raw_analysis_missing_fields() {
        let raw: RawAnalysis = serde_json::from_str(r#"{"score": 50}"#).unwrap();
        assert!(raw.analysis.is_none());
        assert!(raw.confidence_level.is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = r#"{"category": "Splicing", "confidence": 10, "detail": "", "status": "MAYBE"}"#;
        assert!(serde_json::from_str::<AnomalyFinding>(json).is_err());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = ForensicReport {
            is_authentic: false,
            score: 40,
            summary: "Face warping".into(),
            confidence_level: ConfidenceLevel::High,
            analysis: vec![AnomalyFinding::new("Morphing", 80.0, "warp", FindingStatus::Fail)],
            metadata: ReportMetadata {
                duration_seconds: 6.0,
                resolution_label: "1080p (Est)".into(),
                frames_processed: 4,
                audio_processed: false,
            },
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["isAuthentic"], false);
        assert_eq!(json["confidenceLevel"], "HIGH");
        assert_eq!(json["metadata"]["resolution"], "1080p (Est)");
        assert_eq!(json["metadata"]["framesProcessed"], 4);
        assert_eq!(report.anomaly_count(), 1);
        assert_eq!(report.verdict_label(), "MANIPULATION DETECTED");
    }
}
