//! Run controller for the VeriSight forensic pipeline.
//!
//! Ties the media, analysis and dossier crates together behind an explicit
//! state machine, and carries the binary's configuration, logging and
//! metrics helpers.

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::WorkflowConfig;
pub use controller::{Progress, WorkflowController};
pub use error::{WorkflowError, WorkflowResult};
pub use logging::{init_tracing, RunLogger};
