//! Dossier error types.

use std::path::PathBuf;

use thiserror::Error;

pub type DossierResult<T> = Result<T, DossierError>;

#[derive(Debug, Error)]
pub enum DossierError {
    #[error("Report rasterization failed: {0}")]
    Rasterize(String),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Export directory not found: {0}")]
    ExportDirMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DossierError {
    pub fn rasterize(msg: impl Into<String>) -> Self {
        Self::Rasterize(msg.into())
    }

    /// Text shown to the operator.
    pub fn user_message(&self) -> String {
        format!("PDF Error: {}", self)
    }
}
