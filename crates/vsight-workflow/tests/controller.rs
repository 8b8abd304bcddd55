//! Controller state machine tests with in-memory media and analysis backends.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use vsight_analysis::{AnalysisClient, AnalysisError, AnalysisRequest, AnalysisResult, ForensicAnalyzer};
use vsight_dossier::{DossierError, DossierRenderer};
use vsight_media::{MediaError, MediaResult, MediaSource, SampledVideo, VideoInfo};
use vsight_models::{
    AnomalyFinding, AudioPayload, ConfidenceLevel, FindingStatus, MediaFrame, RawAnalysis,
    SessionContext, WorkflowStatus,
};
use vsight_workflow::{WorkflowController, WorkflowError};

struct FakeMedia {
    fail_video: AtomicBool,
    with_audio: bool,
}

impl FakeMedia {
    fn new(with_audio: bool) -> Self {
        Self {
            fail_video: AtomicBool::new(false),
            with_audio,
        }
    }
}

#[async_trait]
impl MediaSource for FakeMedia {
    async fn sample_frames(&self, _path: &Path) -> MediaResult<SampledVideo> {
        if self.fail_video.load(Ordering::SeqCst) {
            return Err(MediaError::media_load("moov atom not found"));
        }
        Ok(SampledVideo {
            info: VideoInfo {
                duration: 12.0,
                width: 1280,
                height: 720,
                fps: 30.0,
                codec: "h264".to_string(),
                has_audio: self.with_audio,
                audio_codec: None,
            },
            frames: (0..6)
                .map(|i| MediaFrame::new(vec![0xFF, 0xD8, i as u8], i as f64 * 2.0))
                .collect(),
        })
    }

    async fn extract_audio(&self, _path: &Path) -> Option<AudioPayload> {
        self.with_audio
            .then(|| AudioPayload::from_wav_bytes(b"RIFF....WAVE".to_vec()))
    }
}

enum Reply {
    Report(RawAnalysis),
    RateLimited,
}

struct FakeAnalyzer {
    reply: Reply,
    gate: Option<Arc<Notify>>,
}

impl FakeAnalyzer {
    fn replying(raw: RawAnalysis) -> Self {
        Self {
            reply: Reply::Report(raw),
            gate: None,
        }
    }
}

#[async_trait]
impl ForensicAnalyzer for FakeAnalyzer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn submit(
        &self,
        request: &AnalysisRequest,
        _session: &SessionContext,
    ) -> AnalysisResult<RawAnalysis> {
        assert_eq!(request.frames_sent(), 3);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reply {
            Reply::Report(raw) => Ok(raw.clone()),
            Reply::RateLimited => Err(AnalysisError::from_http_status(429, "quota exceeded")),
        }
    }
}

fn clean_raw() -> RawAnalysis {
    RawAnalysis {
        is_authentic: Some(true),
        score: Some(92.0),
        summary: Some("No manipulation found".to_string()),
        confidence_level: None,
        analysis: Some(vec![AnomalyFinding::new(
            "Lighting/Shadows",
            95.0,
            "Consistent",
            FindingStatus::Pass,
        )]),
    }
}

fn failing_raw() -> RawAnalysis {
    RawAnalysis {
        is_authentic: Some(true),
        score: Some(95.0),
        summary: Some("Looks fine".to_string()),
        confidence_level: Some(ConfidenceLevel::Low),
        analysis: Some(vec![AnomalyFinding::new(
            "Lip-Sync",
            88.0,
            "Mouth lags audio",
            FindingStatus::Fail,
        )]),
    }
}

fn controller(media: Arc<FakeMedia>, analyzer: FakeAnalyzer) -> WorkflowController {
    WorkflowController::new(
        media,
        AnalysisClient::new(Arc::new(analyzer)),
        DossierRenderer::default(),
        SessionContext::new("agent-7"),
    )
}

#[tokio::test]
async fn test_completed_run_stores_report() {
    let ctrl = controller(Arc::new(FakeMedia::new(true)), FakeAnalyzer::replying(clean_raw()));
    let progress = ctrl.subscribe();
    ctrl.select_file("clip.mp4");

    let report = ctrl.start_analysis().await.unwrap();

    assert_eq!(ctrl.status(), WorkflowStatus::Completed);
    assert!(report.is_authentic);
    assert_eq!(report.score, 92);
    assert_eq!(report.confidence_level, ConfidenceLevel::High);
    assert_eq!(report.metadata.frames_processed, 6);
    assert_eq!(report.metadata.duration_seconds, 10.0);
    assert_eq!(report.metadata.resolution_label, "720p");
    assert!(report.metadata.audio_processed);
    assert_eq!(ctrl.report(), Some(report));
    assert_eq!(ctrl.error_message(), None);
    assert_eq!(progress.borrow().status, WorkflowStatus::Completed);
}

#[tokio::test]
async fn test_fail_finding_forces_manipulated_verdict() {
    let ctrl = controller(Arc::new(FakeMedia::new(true)), FakeAnalyzer::replying(failing_raw()));
    ctrl.select_file("clip.mp4");

    let report = ctrl.start_analysis().await.unwrap();

    assert!(!report.is_authentic);
    assert_eq!(report.score, 40);
    assert_eq!(report.confidence_level, ConfidenceLevel::High);
}

#[tokio::test]
async fn test_missing_audio_still_completes() {
    let ctrl = controller(Arc::new(FakeMedia::new(false)), FakeAnalyzer::replying(clean_raw()));
    ctrl.select_file("silent.mp4");

    let report = ctrl.start_analysis().await.unwrap();

    assert_eq!(ctrl.status(), WorkflowStatus::Completed);
    assert!(!report.metadata.audio_processed);
}

#[tokio::test]
async fn test_start_requires_selected_file() {
    let ctrl = controller(Arc::new(FakeMedia::new(true)), FakeAnalyzer::replying(clean_raw()));

    let err = ctrl.start_analysis().await.unwrap_err();

    assert!(matches!(err, WorkflowError::NoFileSelected));
    assert_eq!(ctrl.status(), WorkflowStatus::Idle);
}

#[tokio::test]
async fn test_start_rejected_after_completion() {
    let ctrl = controller(Arc::new(FakeMedia::new(true)), FakeAnalyzer::replying(clean_raw()));
    ctrl.select_file("clip.mp4");
    ctrl.start_analysis().await.unwrap();

    let err = ctrl.start_analysis().await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::InvalidTransition {
            from: WorkflowStatus::Completed,
            ..
        }
    ));
    assert!(ctrl.report().is_some());
}

#[tokio::test]
async fn test_media_failure_enters_error_and_retry_succeeds() {
    let media = Arc::new(FakeMedia::new(true));
    media.fail_video.store(true, Ordering::SeqCst);
    let ctrl = controller(media.clone(), FakeAnalyzer::replying(clean_raw()));
    ctrl.select_file("broken.mp4");

    let err = ctrl.start_analysis().await.unwrap_err();

    assert!(matches!(err, WorkflowError::Media(MediaError::MediaLoad(_))));
    assert_eq!(ctrl.status(), WorkflowStatus::Error);
    assert!(ctrl.report().is_none());
    assert!(ctrl
        .error_message()
        .unwrap()
        .contains("moov atom not found"));

    media.fail_video.store(false, Ordering::SeqCst);
    ctrl.start_analysis().await.unwrap();
    assert_eq!(ctrl.status(), WorkflowStatus::Completed);
    assert_eq!(ctrl.error_message(), None);
}

#[tokio::test]
async fn test_rate_limit_message_surfaced() {
    let analyzer = FakeAnalyzer {
        reply: Reply::RateLimited,
        gate: None,
    };
    let ctrl = controller(Arc::new(FakeMedia::new(true)), analyzer);
    ctrl.select_file("clip.mp4");

    let err = ctrl.start_analysis().await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(ctrl.status(), WorkflowStatus::Error);
    assert_eq!(
        ctrl.error_message().as_deref(),
        Some("Server Busy (Quota Exceeded). Please try again in a moment.")
    );
    assert_eq!(
        ctrl.subscribe().borrow().message.as_deref(),
        Some("Server Busy (Quota Exceeded). Please try again in a moment.")
    );
}

#[tokio::test]
async fn test_late_result_of_reset_run_is_dropped() {
    let gate = Arc::new(Notify::new());
    let analyzer = FakeAnalyzer {
        reply: Reply::Report(failing_raw()),
        gate: Some(gate.clone()),
    };
    let ctrl = Arc::new(controller(Arc::new(FakeMedia::new(true)), analyzer));
    ctrl.select_file("clip.mp4");

    let mut progress = ctrl.subscribe();
    let run = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.start_analysis().await }
    });

    progress
        .wait_for(|p| p.status == WorkflowStatus::Analyzing)
        .await
        .unwrap();
    ctrl.reset();
    gate.notify_one();

    let result = run.await.unwrap();
    assert!(matches!(result, Err(WorkflowError::Superseded)));
    assert_eq!(ctrl.status(), WorkflowStatus::Idle);
    assert!(ctrl.report().is_none());
    assert!(ctrl.error_message().is_none());
    assert!(ctrl.selected_file().is_none());
}

#[tokio::test]
async fn test_new_selection_supersedes_in_flight_run() {
    let gate = Arc::new(Notify::new());
    let analyzer = FakeAnalyzer {
        reply: Reply::Report(clean_raw()),
        gate: Some(gate.clone()),
    };
    let ctrl = Arc::new(controller(Arc::new(FakeMedia::new(true)), analyzer));
    ctrl.select_file("first.mp4");

    let mut progress = ctrl.subscribe();
    let run = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.start_analysis().await }
    });

    progress
        .wait_for(|p| p.status == WorkflowStatus::Analyzing)
        .await
        .unwrap();
    let token_before = ctrl.run_token();
    ctrl.select_file("second.mp4");
    gate.notify_one();

    assert!(matches!(run.await.unwrap(), Err(WorkflowError::Superseded)));
    assert!(ctrl.run_token() > token_before);
    assert_eq!(ctrl.status(), WorkflowStatus::Idle);
    assert_eq!(
        ctrl.selected_file().unwrap().to_string_lossy(),
        "second.mp4"
    );
}

#[tokio::test]
async fn test_export_before_completion_rejected() {
    let ctrl = controller(Arc::new(FakeMedia::new(true)), FakeAnalyzer::replying(clean_raw()));
    ctrl.select_file("clip.mp4");

    let err = ctrl.export_dossier().await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_export_writes_dossier() {
    let dir = tempfile::tempdir().unwrap();
    let ctrl = controller(Arc::new(FakeMedia::new(true)), FakeAnalyzer::replying(failing_raw()))
        .with_export_dir(dir.path());
    ctrl.select_file("clip.mp4");
    ctrl.start_analysis().await.unwrap();

    let path = ctrl.export_dossier().await.unwrap();

    assert!(path.starts_with(dir.path()));
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
    assert_eq!(ctrl.status(), WorkflowStatus::Completed);
}

#[tokio::test]
async fn test_export_failure_keeps_report() {
    let dir = tempfile::tempdir().unwrap();
    let ctrl = controller(Arc::new(FakeMedia::new(true)), FakeAnalyzer::replying(clean_raw()));
    ctrl.select_file("clip.mp4");
    let report = ctrl.start_analysis().await.unwrap();

    let err = ctrl
        .export_dossier_to(dir.path().join("missing"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Dossier(DossierError::ExportDirMissing(_))
    ));
    assert_eq!(ctrl.status(), WorkflowStatus::Completed);
    assert_eq!(ctrl.report(), Some(report));
    assert!(ctrl.error_message().is_none());
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let ctrl = controller(Arc::new(FakeMedia::new(true)), FakeAnalyzer::replying(clean_raw()));
    ctrl.select_file("clip.mp4");
    ctrl.start_analysis().await.unwrap();

    ctrl.reset();

    assert_eq!(ctrl.status(), WorkflowStatus::Idle);
    assert!(ctrl.report().is_none());
    assert!(ctrl.selected_file().is_none());
    assert!(matches!(
        ctrl.start_analysis().await,
        Err(WorkflowError::NoFileSelected)
    ));
}
