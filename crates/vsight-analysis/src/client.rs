//! Backend trait and the normalizing analysis client.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};
use vsight_models::normalize::normalize_with_resolution;
use vsight_models::{AudioPayload, ForensicReport, MediaFrame, RawAnalysis, SessionContext};

use crate::error::AnalysisResult;
use crate::types::AnalysisRequest;

/// A remote service that turns sampled media into a raw forensic verdict.
#[async_trait]
pub trait ForensicAnalyzer: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Submit one request. Implementations must not retry.
    async fn submit(
        &self,
        request: &AnalysisRequest,
        session: &SessionContext,
    ) -> AnalysisResult<RawAnalysis>;
}

/// Submits sampled media and normalizes the response into a report.
#[derive(Clone)]
pub struct AnalysisClient {
    analyzer: Arc<dyn ForensicAnalyzer>,
}

impl AnalysisClient {
    pub fn new(analyzer: Arc<dyn ForensicAnalyzer>) -> Self {
        Self { analyzer }
    }

    pub fn backend_name(&self) -> &'static str {
        self.analyzer.name()
    }

    /// Analyze the sampled frames and optional audio.
    ///
    /// `frames` is the full sampled list; the report's `frames_processed`
    /// counts all of them even though only the even-indexed subset is sent.
    pub async fn analyze(
        &self,
        session: &SessionContext,
        frames: &[MediaFrame],
        audio: Option<&AudioPayload>,
        resolution_label: Option<&str>,
    ) -> AnalysisResult<ForensicReport> {
        let request = AnalysisRequest::new(frames, audio);
        let backend = self.analyzer.name();

        info!(
            backend,
            frames_sampled = frames.len(),
            frames_sent = request.frames_sent(),
            audio = request.has_audio(),
            "Submitting media for forensic analysis"
        );

        let started = Instant::now();
        let raw = match self.analyzer.submit(&request, session).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    backend,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    retryable = e.is_retryable(),
                    "Analysis request failed: {}",
                    e
                );
                return Err(e);
            }
        };

        let report = normalize_with_resolution(raw, frames, audio.is_some(), resolution_label)?;

        info!(
            backend,
            elapsed_ms = started.elapsed().as_millis() as u64,
            score = report.score,
            authentic = report.is_authentic,
            anomalies = report.anomaly_count(),
            "Analysis complete"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisClient")
            .field("backend", &self.analyzer.name())
            .finish()
    }
}
