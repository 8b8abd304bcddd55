//! Dossier rendering and export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use vsight_models::{ForensicReport, SessionContext};

use crate::error::{DossierError, DossierResult};
use crate::layout::{findings_log, paginate, Watermark, LINES_PER_PAGE};
use crate::pdf::{assemble, DocumentParts};
use crate::raster::{PanelRasterizer, ReportRasterizer};

/// Document name for a dossier exported on `date`.
pub fn dossier_filename(date: NaiveDate) -> String {
    format!("VeriSight_Report_{}.pdf", date.format("%Y-%m-%d"))
}

/// A rendered dossier held in memory.
#[derive(Debug, Clone)]
pub struct Dossier {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Renders forensic reports into PDF dossiers.
#[derive(Clone)]
pub struct DossierRenderer {
    rasterizer: Arc<dyn ReportRasterizer>,
}

impl Default for DossierRenderer {
    fn default() -> Self {
        Self::new(Arc::new(PanelRasterizer::default()))
    }
}

impl DossierRenderer {
    pub fn new(rasterizer: Arc<dyn ReportRasterizer>) -> Self {
        Self { rasterizer }
    }

    /// Render a dossier dated today (UTC).
    pub fn render(
        &self,
        report: &ForensicReport,
        session: &SessionContext,
    ) -> DossierResult<Dossier> {
        self.render_on(report, session, Utc::now().date_naive())
    }

    /// Render a dossier with an explicit date.
    pub fn render_on(
        &self,
        report: &ForensicReport,
        session: &SessionContext,
        date: NaiveDate,
    ) -> DossierResult<Dossier> {
        let raster = self.rasterizer.rasterize(report)?;
        debug!(
            width = raster.width,
            height = raster.height,
            jpeg_bytes = raster.jpeg.len(),
            "Report panel rasterized"
        );

        let log_pages = paginate(findings_log(report, session), LINES_PER_PAGE);
        let (bytes, page_count) = assemble(&DocumentParts {
            raster: &raster,
            log_pages: &log_pages,
            watermark: Watermark::for_report(report),
            operator_id: &session.operator_id,
        })?;

        Ok(Dossier {
            filename: dossier_filename(date),
            bytes,
            page_count,
        })
    }

    /// Render and write the dossier into `dir`, returning the file path.
    ///
    /// An existing file with the same name is overwritten.
    pub fn export(
        &self,
        report: &ForensicReport,
        session: &SessionContext,
        dir: &Path,
    ) -> DossierResult<PathBuf> {
        if !dir.is_dir() {
            return Err(DossierError::ExportDirMissing(dir.to_path_buf()));
        }

        let dossier = self.render(report, session)?;
        let path = dir.join(&dossier.filename);
        std::fs::write(&path, &dossier.bytes)?;

        info!(
            path = %path.display(),
            pages = dossier.page_count,
            bytes = dossier.bytes.len(),
            operator = %session.operator_id,
            "Dossier exported"
        );

        Ok(path)
    }
}

impl std::fmt::Debug for DossierRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DossierRenderer").finish_non_exhaustive()
    }
}
