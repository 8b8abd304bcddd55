//! Pipeline metrics.
//!
//! Emitted through the `metrics` facade; they are no-ops unless the host
//! process installs a recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_STARTED_TOTAL: &str = "vsight_runs_started_total";
    pub const RUNS_COMPLETED_TOTAL: &str = "vsight_runs_completed_total";
    pub const RUNS_FAILED_TOTAL: &str = "vsight_runs_failed_total";
    pub const RUNS_SUPERSEDED_TOTAL: &str = "vsight_runs_superseded_total";

    pub const FRAMES_SAMPLED: &str = "vsight_frames_sampled";
    pub const AUDIO_ABSENT_TOTAL: &str = "vsight_audio_absent_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "vsight_analysis_duration_seconds";

    pub const DOSSIERS_EXPORTED_TOTAL: &str = "vsight_dossiers_exported_total";
    pub const DOSSIER_FAILURES_TOTAL: &str = "vsight_dossier_failures_total";
}

pub fn record_run_started() {
    counter!(names::RUNS_STARTED_TOTAL).increment(1);
}

pub fn record_run_completed(is_authentic: bool) {
    let labels = [("verdict", verdict_label(is_authentic).to_string())];
    counter!(names::RUNS_COMPLETED_TOTAL, &labels).increment(1);
}

pub fn record_run_failed(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::RUNS_FAILED_TOTAL, &labels).increment(1);
}

pub fn record_run_superseded() {
    counter!(names::RUNS_SUPERSEDED_TOTAL).increment(1);
}

pub fn record_frames_sampled(count: usize) {
    histogram!(names::FRAMES_SAMPLED).record(count as f64);
}

pub fn record_audio_absent() {
    counter!(names::AUDIO_ABSENT_TOTAL).increment(1);
}

pub fn record_analysis_duration(backend: &str, success: bool, duration_secs: f64) {
    let labels = [
        ("backend", backend.to_string()),
        ("outcome", if success { "ok" } else { "error" }.to_string()),
    ];
    histogram!(names::ANALYSIS_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_dossier_exported() {
    counter!(names::DOSSIERS_EXPORTED_TOTAL).increment(1);
}

pub fn record_dossier_failed() {
    counter!(names::DOSSIER_FAILURES_TOTAL).increment(1);
}

fn verdict_label(is_authentic: bool) -> &'static str {
    if is_authentic {
        "authentic"
    } else {
        "manipulated"
    }
}
