//! Workflow status for a pipeline run.

use serde::{Deserialize, Serialize};

/// Status of the single active pipeline run.
///
/// Transitions: `Idle -> Extracting -> Analyzing -> Completed | Error`.
/// Resetting returns to `Idle` from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// No run in progress
    #[default]
    Idle,
    /// Sampling frames and resampling audio
    Extracting,
    /// Waiting on the remote analysis call
    Analyzing,
    /// Report available
    Completed,
    /// Run failed; retry or reset
    Error,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// True while a run is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Extracting | Self::Analyzing)
    }

    /// True if a new run may be started from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Error)
    }

    /// Operator-facing progress line.
    pub fn progress_message(&self) -> Option<&'static str> {
        match self {
            Self::Extracting => Some("Extracting Bio-Signals..."),
            Self::Analyzing => Some("Running Neural Physics Engine..."),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_allowed_states() {
        assert!(WorkflowStatus::Idle.can_start());
        assert!(WorkflowStatus::Error.can_start());
        assert!(!WorkflowStatus::Extracting.can_start());
        assert!(!WorkflowStatus::Analyzing.can_start());
        assert!(!WorkflowStatus::Completed.can_start());
    }

    #[test]
    fn test_progress_messages() {
        assert!(WorkflowStatus::Extracting.progress_message().is_some());
        assert!(WorkflowStatus::Idle.progress_message().is_none());
        assert_eq!(WorkflowStatus::Analyzing.to_string(), "analyzing");
    }
}
