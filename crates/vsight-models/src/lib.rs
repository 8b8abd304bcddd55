//! Shared data models for the VeriSight forensic pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Sampled media (frames and audio payloads)
//! - Raw analysis responses and normalized forensic reports
//! - Canonical detection vectors
//! - Workflow status and the operator session

pub mod audio;
mod encoding;
pub mod frame;
pub mod normalize;
pub mod report;
pub mod session;
pub mod status;
pub mod vectors;

// Re-export common types
pub use audio::AudioPayload;
pub use frame::MediaFrame;
pub use normalize::{normalize, ReportError, DEFAULT_RESOLUTION_LABEL};
pub use report::{
    AnomalyFinding, ConfidenceLevel, FindingStatus, ForensicReport, RawAnalysis,
    ReportMetadata,
};
pub use session::SessionContext;
pub use status::WorkflowStatus;
pub use vectors::{align_findings, DetectionVector, CANONICAL_VECTORS};
