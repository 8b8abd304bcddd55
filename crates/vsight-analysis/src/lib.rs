//! Client for the remote forensic analysis service.
//!
//! This crate provides:
//! - `AnalysisRequest` construction (even-indexed frame subset plus audio)
//! - The `ForensicAnalyzer` backend trait
//! - `RelayClient` for the VeriSight analysis relay
//! - `GeminiClient` for calling Gemini directly with a response schema
//! - `AnalysisClient`, which submits a request and normalizes the result

pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod relay;
pub mod types;

pub use client::{AnalysisClient, ForensicAnalyzer};
pub use config::{build_analyzer, AnalysisConfig, BackendKind};
pub use error::{AnalysisError, AnalysisResult, MALFORMED_MESSAGE, RATE_LIMITED_MESSAGE};
pub use gemini::GeminiClient;
pub use relay::RelayClient;
pub use types::AnalysisRequest;
