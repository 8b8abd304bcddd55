//! Canonical detection vectors.
//!
//! Findings arrive in whatever order the remote model chose. Display code
//! aligns them against this fixed list so each vector keeps its slot.

use crate::report::{AnomalyFinding, FindingStatus};

/// Detail text for a vector the response did not mention.
pub const UNREPORTED_DETAIL: &str = "No anomalies detected for this vector.";

/// A named detection vector and the keywords that identify it in free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionVector {
    pub label: &'static str,
    keywords: &'static [&'static str],
}

impl DetectionVector {
    /// True if a finding category refers to this vector.
    pub fn matches(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        self.keywords.iter().any(|k| category.contains(k))
    }
}

/// The ten vectors in display order.
pub const CANONICAL_VECTORS: [DetectionVector; 10] = [
    DetectionVector {
        label: "Deepfake/Identity Swap",
        keywords: &["deepfake", "identity", "face swap", "face-swap"],
    },
    DetectionVector {
        label: "AI Voice/TTS",
        keywords: &["voice", "tts", "speech synth"],
    },
    DetectionVector {
        label: "Lip-Sync",
        keywords: &["lip"],
    },
    DetectionVector {
        label: "Generative AI",
        keywords: &["generative", "ai generated", "ai-generated", "synthetic"],
    },
    DetectionVector {
        label: "Puppetry",
        keywords: &["puppet", "reenact"],
    },
    DetectionVector {
        label: "Morphing",
        keywords: &["morph", "warp"],
    },
    DetectionVector {
        label: "Lighting/Shadows",
        keywords: &["light", "shadow", "reflection"],
    },
    DetectionVector {
        label: "Splicing",
        keywords: &["splic", "edit", "cut"],
    },
    DetectionVector {
        label: "Speed Artifacts",
        keywords: &["speed", "frame rate", "framerate", "temporal"],
    },
    DetectionVector {
        label: "Metadata/Text",
        keywords: &["metadata", "text", "caption", "watermark"],
    },
];

/// Arrange findings into one slot per canonical vector.
///
/// Each slot takes the first finding whose category matches it; a finding is
/// used for at most one slot. Unmatched slots default to PASS.
pub fn align_findings(findings: &[AnomalyFinding]) -> Vec<AnomalyFinding> {
    let mut used = vec![false; findings.len()];

    CANONICAL_VECTORS
        .iter()
        .map(|vector| {
            let hit = findings
                .iter()
                .enumerate()
                .find(|(i, f)| !used[*i] && vector.matches(&f.category));

            match hit {
                Some((i, finding)) => {
                    used[i] = true;
                    AnomalyFinding {
                        category: vector.label.to_string(),
                        ..finding.clone()
                    }
                }
                None => AnomalyFinding::new(vector.label, 0.0, UNREPORTED_DETAIL, FindingStatus::Pass),
            }
        })
        .collect()
}
