//! End-to-end dossier rendering tests.

use std::sync::Arc;

use chrono::NaiveDate;
use lopdf::Document;
use vsight_dossier::{
    dossier_filename, DossierError, DossierRenderer, DossierResult, RasterImage, ReportRasterizer,
};
use vsight_models::{
    AnomalyFinding, ConfidenceLevel, FindingStatus, ForensicReport, ReportMetadata, SessionContext,
};

fn report(is_authentic: bool, findings: Vec<AnomalyFinding>) -> ForensicReport {
    ForensicReport {
        is_authentic,
        score: if is_authentic { 94 } else { 32 },
        summary: "Consistent lighting, natural lip movement.".to_string(),
        confidence_level: ConfidenceLevel::High,
        analysis: findings,
        metadata: ReportMetadata {
            duration_seconds: 10.0,
            resolution_label: "1080p (Est)".to_string(),
            frames_processed: 6,
            audio_processed: true,
        },
    }
}

fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
        .collect()
}

#[test]
fn test_filename_format() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    assert_eq!(dossier_filename(date), "VeriSight_Report_2024-03-07.pdf");
}

#[test]
fn test_authentic_dossier_watermarked_on_every_page() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    let dossier = DossierRenderer::default()
        .render_on(&report(true, vec![]), &SessionContext::new("agent-7"), date)
        .unwrap();

    assert!(dossier.bytes.starts_with(b"%PDF-"));
    assert_eq!(dossier.filename, "VeriSight_Report_2024-03-07.pdf");
    assert_eq!(dossier.page_count, 2);

    let pages = page_texts(&dossier.bytes);
    assert_eq!(pages.len(), 2);
    for page in &pages {
        assert!(page.contains("VERIFIED AUTHENTIC"));
        assert!(page.contains("AGENT: agent-7"));
        assert!(!page.contains("MANIPULATION DETECTED"));
    }
    assert!(pages[0].contains("/Im1 Do"));
}

#[test]
fn test_manipulated_dossier_paginates_findings() {
    let long_detail = "Boundary artifacts around the jawline shift between frames. ".repeat(6);
    let findings: Vec<AnomalyFinding> = (0..30)
        .map(|i| {
            AnomalyFinding::new(
                format!("Vector {}", i),
                70.0,
                long_detail.clone(),
                if i % 3 == 0 {
                    FindingStatus::Fail
                } else {
                    FindingStatus::Warn
                },
            )
        })
        .collect();

    let dossier = DossierRenderer::default()
        .render(&report(false, findings), &SessionContext::new("K"))
        .unwrap();

    assert!(dossier.page_count > 3);
    let pages = page_texts(&dossier.bytes);
    assert_eq!(pages.len(), dossier.page_count);
    assert!(pages.iter().all(|p| p.contains("MANIPULATION DETECTED")));
    assert!(pages.iter().all(|p| p.contains("AGENT: K")));
    assert!(pages[1].contains("[FAIL] Vector 0"));
}

struct BrokenRasterizer;

impl ReportRasterizer for BrokenRasterizer {
    fn rasterize(&self, _report: &ForensicReport) -> DossierResult<RasterImage> {
        Err(DossierError::rasterize("canvas unavailable"))
    }
}

#[test]
fn test_rasterizer_failure_surfaces_as_dossier_error() {
    let renderer = DossierRenderer::new(Arc::new(BrokenRasterizer));
    let err = renderer
        .render(&report(true, vec![]), &SessionContext::default())
        .unwrap_err();

    assert!(matches!(err, DossierError::Rasterize(_)));
}

#[test]
fn test_export_writes_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = DossierRenderer::default()
        .export(&report(true, vec![]), &SessionContext::new("agent-7"), dir.path())
        .unwrap();

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("VeriSight_Report_"));
    assert!(name.ends_with(".pdf"));
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
}

#[test]
fn test_export_to_missing_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = DossierRenderer::default()
        .export(&report(true, vec![]), &SessionContext::default(), &missing)
        .unwrap_err();

    assert!(matches!(err, DossierError::ExportDirMissing(_)));
}
