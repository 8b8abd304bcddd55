//! Client for the VeriSight analysis relay.
//!
//! The relay holds the model credentials and forwards the request to the
//! model. Errors come back as `{ "error": "<message>" }` with a non-2xx code.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use vsight_models::{RawAnalysis, SessionContext};

use crate::client::ForensicAnalyzer;
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::AnalysisRequest;

/// Path of the analysis route on the relay.
pub const ANALYZE_PATH: &str = "api/analyze";

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: Option<String>,
}

/// HTTP client for the relay's analyze route.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    endpoint: Url,
}

impl RelayClient {
    /// Create a client for the relay rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> AnalysisResult<Self> {
        let endpoint = analyze_endpoint(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ForensicAnalyzer for RelayClient {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn submit(
        &self,
        request: &AnalysisRequest,
        session: &SessionContext,
    ) -> AnalysisResult<RawAnalysis> {
        let mut builder = self.http.post(self.endpoint.clone()).json(request);
        if let Some(token) = &session.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<RelayErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| "Server Analysis Failed".to_string());
            return Err(AnalysisError::from_http_status(status.as_u16(), message));
        }

        debug!(bytes = body.len(), "Relay response received");
        parse_raw_analysis(&body)
    }
}

/// Parse a response body, rejecting anything without an `analysis` array.
pub(crate) fn parse_raw_analysis(body: &[u8]) -> AnalysisResult<RawAnalysis> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AnalysisError::malformed("empty response body"));
    }

    let raw: RawAnalysis = serde_json::from_slice(body)
        .map_err(|e| AnalysisError::malformed(format!("invalid report JSON: {}", e)))?;

    if raw.analysis.is_none() {
        return Err(AnalysisError::malformed("response has no analysis array"));
    }

    Ok(raw)
}

fn analyze_endpoint(base_url: &str) -> AnalysisResult<Url> {
    let mut base = Url::parse(base_url)
        .map_err(|e| AnalysisError::config(format!("Invalid relay URL '{}': {}", base_url, e)))?;

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(ANALYZE_PATH)
        .map_err(|e| AnalysisError::config(format!("Invalid relay URL '{}': {}", base_url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_bare_host() {
        let url = analyze_endpoint("https://relay.example.com").unwrap();
        assert_eq!(url.as_str(), "https://relay.example.com/api/analyze");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = analyze_endpoint("http://localhost:5000/forensics").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/forensics/api/analyze");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = analyze_endpoint("not a url").unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn test_parse_rejects_empty_body() {
        assert!(parse_raw_analysis(b"  ").unwrap_err().is_malformed());
    }

    #[test]
    fn test_parse_rejects_missing_analysis() {
        let body = br#"{"isAuthentic":true,"score":90,"summary":"ok","confidenceLevel":"HIGH"}"#;
        assert!(parse_raw_analysis(body).unwrap_err().is_malformed());
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let body = br#"{"analysis":[{"category":"Splicing","confidence":50,"detail":"x","status":"MAYBE"}]}"#;
        assert!(parse_raw_analysis(body).unwrap_err().is_malformed());
    }

    #[test]
    fn test_parse_accepts_minimal_report() {
        let body = br#"{"analysis":[]}"#;
        let raw = parse_raw_analysis(body).unwrap();
        assert_eq!(raw.analysis, Some(vec![]));
        assert_eq!(raw.score, None);
    }
}
