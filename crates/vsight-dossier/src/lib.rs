//! PDF dossier rendering for forensic reports.
//!
//! A dossier is an A4 document: page 1 carries a raster of the report
//! panel, the following pages carry the textual findings log, and every
//! page is stamped with a diagonal verdict watermark and the operator id.

pub mod error;
pub mod layout;
pub mod pdf;
pub mod raster;
pub mod render;

pub use error::{DossierError, DossierResult};
pub use raster::{PanelRasterizer, RasterImage, ReportRasterizer};
pub use render::{dossier_filename, Dossier, DossierRenderer};
