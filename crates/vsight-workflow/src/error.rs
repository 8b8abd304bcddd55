//! Workflow error types.

use thiserror::Error;
use vsight_analysis::AnalysisError;
use vsight_dossier::DossierError;
use vsight_media::MediaError;
use vsight_models::WorkflowStatus;

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Dossier(#[from] DossierError),

    #[error("Cannot {action} while {from}")]
    InvalidTransition {
        from: WorkflowStatus,
        action: &'static str,
    },

    #[error("No file selected")]
    NoFileSelected,

    /// A newer run, reset or file selection replaced this run.
    #[error("Run superseded by a newer request")]
    Superseded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    pub fn invalid_transition(from: WorkflowStatus, action: &'static str) -> Self {
        Self::InvalidTransition { from, action }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True if re-running the analysis may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Analysis(e) => e.is_retryable(),
            Self::Media(e) => matches!(e, MediaError::Timeout(_)),
            Self::Dossier(_) => true,
            _ => false,
        }
    }

    /// Text shown to the operator.
    pub fn user_message(&self) -> String {
        match self {
            Self::Analysis(e) => e.user_message(),
            Self::Dossier(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Media(_) => "media",
            Self::Analysis(AnalysisError::RateLimited(_)) => "rate_limited",
            Self::Analysis(AnalysisError::MalformedResponse(_)) => "malformed",
            Self::Analysis(AnalysisError::Transport(_)) => "transport",
            Self::Analysis(_) => "analysis",
            Self::Dossier(_) => "dossier",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NoFileSelected => "no_file",
            Self::Superseded => "superseded",
            Self::Internal(_) => "internal",
        }
    }
}
