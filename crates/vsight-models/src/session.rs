//! Operator session handed in by the authentication layer.

use serde::{Deserialize, Serialize};

/// Identity of the operator running the pipeline.
///
/// Built by whatever authenticates the operator and passed explicitly to
/// the components that need it. The pipeline never stores or validates
/// credentials itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Operator label stamped on exported dossiers
    pub operator_id: String,
    /// Bearer token forwarded to the analysis relay, if any
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl SessionContext {
    pub fn new(operator_id: impl Into<String>) -> Self {
        Self {
            operator_id: operator_id.into(),
            token: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new("UNKNOWN")
    }
}
