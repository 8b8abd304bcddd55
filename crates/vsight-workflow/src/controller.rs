//! Run state machine.
//!
//! `Idle -> Extracting -> Analyzing -> Completed | Error`, with `reset`
//! returning to `Idle` from any state. Every run gets a fresh token; a run
//! whose token no longer matches when it resolves is dropped without
//! touching state, so a reset or new file selection always wins over a
//! late result.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, warn, Instrument};
use vsight_analysis::{build_analyzer, AnalysisClient};
use vsight_dossier::DossierRenderer;
use vsight_media::{FfmpegMediaSource, MediaSource};
use vsight_models::{ForensicReport, SessionContext, WorkflowStatus};

use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::logging::RunLogger;
use crate::metrics;

/// Operation name attached to run logs.
pub const ANALYSIS_OPERATION: &str = "forensic_analysis";

/// Snapshot published to subscribers on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub run_token: u64,
    pub status: WorkflowStatus,
    /// Progress line while busy, error text after a failure
    pub message: Option<String>,
}

#[derive(Debug, Default)]
struct RunState {
    status: WorkflowStatus,
    selected: Option<PathBuf>,
    report: Option<ForensicReport>,
    error: Option<String>,
    token: u64,
}

impl RunState {
    fn progress(&self) -> Progress {
        Progress {
            run_token: self.token,
            status: self.status,
            message: self
                .error
                .clone()
                .or_else(|| self.status.progress_message().map(str::to_string)),
        }
    }

    /// Invalidate any in-flight run and return to `Idle`.
    fn clear(&mut self) {
        self.token += 1;
        self.status = WorkflowStatus::Idle;
        self.report = None;
        self.error = None;
    }
}

/// Drives one file at a time through sampling, analysis and export.
pub struct WorkflowController {
    media: Arc<dyn MediaSource>,
    analysis: AnalysisClient,
    renderer: DossierRenderer,
    session: SessionContext,
    export_dir: PathBuf,
    state: Mutex<RunState>,
    progress: watch::Sender<Progress>,
}

impl WorkflowController {
    pub fn new(
        media: Arc<dyn MediaSource>,
        analysis: AnalysisClient,
        renderer: DossierRenderer,
        session: SessionContext,
    ) -> Self {
        let state = RunState::default();
        let (progress, _) = watch::channel(state.progress());

        Self {
            media,
            analysis,
            renderer,
            session,
            export_dir: PathBuf::from("."),
            state: Mutex::new(state),
            progress,
        }
    }

    /// Build the FFmpeg-backed controller from configuration.
    pub fn from_config(config: &WorkflowConfig, session: SessionContext) -> WorkflowResult<Self> {
        let media = FfmpegMediaSource::new(config.frames.clone(), config.audio.clone());
        let analysis = AnalysisClient::new(build_analyzer(&config.analysis)?);

        Ok(Self::new(Arc::new(media), analysis, DossierRenderer::default(), session)
            .with_export_dir(config.export_dir.clone()))
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn status(&self) -> WorkflowStatus {
        self.lock().status
    }

    pub fn report(&self) -> Option<ForensicReport> {
        self.lock().report.clone()
    }

    /// Message of the last failed run, if the controller is in `Error`.
    pub fn error_message(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn selected_file(&self) -> Option<PathBuf> {
        self.lock().selected.clone()
    }

    pub fn run_token(&self) -> u64 {
        self.lock().token
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Receive a `Progress` snapshot on every transition.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Select the file for the next run, discarding any current run.
    pub fn select_file(&self, path: impl Into<PathBuf>) {
        let mut state = self.lock();
        state.clear();
        state.selected = Some(path.into());
        self.publish(&state);
    }

    /// Discard the file, report and error and return to `Idle`.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.clear();
        state.selected = None;
        self.publish(&state);
    }

    /// Run the pipeline on the selected file.
    ///
    /// Allowed from `Idle` or `Error`. Returns `Superseded` if a reset or
    /// new selection happened while the run was in flight.
    pub async fn start_analysis(&self) -> WorkflowResult<ForensicReport> {
        let (token, path) = {
            let mut state = self.lock();
            if !state.status.can_start() {
                return Err(WorkflowError::invalid_transition(
                    state.status,
                    "start analysis",
                ));
            }
            let path = state.selected.clone().ok_or(WorkflowError::NoFileSelected)?;

            state.token += 1;
            state.status = WorkflowStatus::Extracting;
            state.report = None;
            state.error = None;
            self.publish(&state);
            (state.token, path)
        };

        let logger = RunLogger::new(ANALYSIS_OPERATION);
        logger.log_start(&path.display().to_string());
        metrics::record_run_started();

        let span = logger.create_span();
        let result = self.run_pipeline(token, &path, &logger).instrument(span).await;
        self.finish(token, result, &logger)
    }

    async fn run_pipeline(
        &self,
        token: u64,
        path: &Path,
        logger: &RunLogger,
    ) -> WorkflowResult<ForensicReport> {
        let (sampled, audio) = tokio::join!(
            self.media.sample_frames(path),
            self.media.extract_audio(path)
        );
        let sampled = sampled?;

        metrics::record_frames_sampled(sampled.frames.len());
        if audio.is_none() {
            metrics::record_audio_absent();
            logger.log_warning("No usable audio track, analyzing frames only");
        }
        logger.log_progress(&format!(
            "Sampled {} frames, audio {}",
            sampled.frames.len(),
            if audio.is_some() { "present" } else { "absent" }
        ));

        self.advance(token, WorkflowStatus::Analyzing)?;

        let started = Instant::now();
        let result = self
            .analysis
            .analyze(
                &self.session,
                &sampled.frames,
                audio.as_ref(),
                sampled.resolution_label().as_deref(),
            )
            .await;
        metrics::record_analysis_duration(
            self.analysis.backend_name(),
            result.is_ok(),
            started.elapsed().as_secs_f64(),
        );

        Ok(result?)
    }

    /// Move to `next` if `token` is still the active run.
    fn advance(&self, token: u64, next: WorkflowStatus) -> WorkflowResult<()> {
        let mut state = self.lock();
        if state.token != token {
            return Err(WorkflowError::Superseded);
        }
        state.status = next;
        self.publish(&state);
        Ok(())
    }

    fn finish(
        &self,
        token: u64,
        result: WorkflowResult<ForensicReport>,
        logger: &RunLogger,
    ) -> WorkflowResult<ForensicReport> {
        let mut state = self.lock();

        if state.token != token || matches!(result, Err(WorkflowError::Superseded)) {
            metrics::record_run_superseded();
            logger.log_warning("Result dropped, run was superseded");
            return Err(WorkflowError::Superseded);
        }

        match result {
            Ok(report) => {
                state.status = WorkflowStatus::Completed;
                state.report = Some(report.clone());
                self.publish(&state);

                metrics::record_run_completed(report.is_authentic);
                logger.log_completion(&format!(
                    "{} (score {})",
                    report.verdict_label(),
                    report.score
                ));
                Ok(report)
            }
            Err(e) => {
                state.status = WorkflowStatus::Error;
                state.error = Some(e.user_message());
                self.publish(&state);

                metrics::record_run_failed(e.kind());
                logger.log_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Export the completed report to the configured directory.
    pub async fn export_dossier(&self) -> WorkflowResult<PathBuf> {
        let dir = self.export_dir.clone();
        self.export_dossier_to(dir).await
    }

    /// Export the completed report into `dir`.
    ///
    /// Failures leave the status and report untouched so export can be
    /// retried.
    pub async fn export_dossier_to(&self, dir: impl Into<PathBuf>) -> WorkflowResult<PathBuf> {
        let report = {
            let state = self.lock();
            match (&state.status, &state.report) {
                (WorkflowStatus::Completed, Some(report)) => report.clone(),
                _ => {
                    return Err(WorkflowError::invalid_transition(
                        state.status,
                        "export dossier",
                    ))
                }
            }
        };

        let renderer = self.renderer.clone();
        let session = self.session.clone();
        let dir = dir.into();

        let result = tokio::task::spawn_blocking(move || renderer.export(&report, &session, &dir))
            .await
            .map_err(|e| WorkflowError::internal(format!("Dossier task failed: {}", e)))?;

        match result {
            Ok(path) => {
                metrics::record_dossier_exported();
                debug!(path = %path.display(), "Dossier ready");
                Ok(path)
            }
            Err(e) => {
                metrics::record_dossier_failed();
                warn!(error = %e, "Dossier export failed");
                Err(e.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &RunState) {
        self.progress.send_replace(state.progress());
    }
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("analysis", &self.analysis)
            .field("export_dir", &self.export_dir)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
