//! Analysis backend configuration.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::client::ForensicAnalyzer;
use crate::error::{AnalysisError, AnalysisResult};
use crate::gemini::{GeminiClient, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::relay::RelayClient;

pub const DEFAULT_RELAY_URL: &str = "https://verisight-api.onrender.com";

/// Which service performs the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// The VeriSight relay, which holds the model credentials
    #[default]
    Relay,
    /// Gemini called directly with a local API key
    Gemini,
}

impl FromStr for BackendKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relay" => Ok(Self::Relay),
            "gemini" => Ok(Self::Gemini),
            other => Err(AnalysisError::config(format!(
                "Unknown analysis backend '{}' (expected relay or gemini)",
                other
            ))),
        }
    }
}

/// Analysis client configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub backend: BackendKind,
    /// Relay root; the analyze route is appended
    pub relay_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Request timeout for one analysis call
    pub timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Relay,
            relay_url: DEFAULT_RELAY_URL.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables.
    ///
    /// An unrecognized `VSIGHT_ANALYSIS_BACKEND` is an error rather than a
    /// silent fallback, so a typo never sends media to the wrong service.
    pub fn from_env() -> AnalysisResult<Self> {
        let backend = match std::env::var("VSIGHT_ANALYSIS_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => BackendKind::default(),
        };

        Ok(Self {
            backend,
            relay_url: std::env::var("VSIGHT_RELAY_URL")
                .unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string()),
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("VSIGHT_ANALYSIS_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        })
    }
}

/// Build the configured backend.
pub fn build_analyzer(config: &AnalysisConfig) -> AnalysisResult<Arc<dyn ForensicAnalyzer>> {
    match config.backend {
        BackendKind::Relay => {
            let client = RelayClient::new(&config.relay_url, config.timeout)?;
            info!(endpoint = %client.endpoint(), "Using analysis relay");
            Ok(Arc::new(client))
        }
        BackendKind::Gemini => {
            let key = config
                .gemini_api_key
                .as_deref()
                .ok_or_else(|| AnalysisError::config("GEMINI_API_KEY not set"))?;
            let client = GeminiClient::new(key, &config.gemini_model, config.timeout)?
                .with_base_url(&config.gemini_base_url);
            info!(model = %config.gemini_model, "Using Gemini analysis backend");
            Ok(Arc::new(client))
        }
    }
}
