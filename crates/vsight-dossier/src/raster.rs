//! Report panel rasterization.

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgb, RgbImage};
use vsight_models::{FindingStatus, ForensicReport};

use crate::error::{DossierError, DossierResult};

pub const GREEN: [u8; 3] = [16, 185, 129];
pub const RED: [u8; 3] = [239, 68, 68];
pub const AMBER: [u8; 3] = [245, 158, 11];

const BACKGROUND: [u8; 3] = [255, 255, 255];
const TRACK: [u8; 3] = [226, 232, 240];
const INK: [u8; 3] = [15, 23, 42];

// Panel geometry in unscaled pixels.
const PANEL_WIDTH: u32 = 400;
const PADDING: u32 = 16;
const BANNER_HEIGHT: u32 = 48;
const GAUGE_HEIGHT: u32 = 16;
const ROW_HEIGHT: u32 = 14;
const ROW_GAP: u32 = 12;
const SWATCH: u32 = 14;

/// A JPEG-encoded picture of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RasterImage {
    /// Height over width.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 {
            0.0
        } else {
            self.height as f32 / self.width as f32
        }
    }
}

/// Produces the visual representation embedded on the first dossier page.
pub trait ReportRasterizer: Send + Sync {
    fn rasterize(&self, report: &ForensicReport) -> DossierResult<RasterImage>;
}

/// Draws the report panel: verdict banner, score gauge, and one status row
/// per canonical detection vector.
#[derive(Debug, Clone)]
pub struct PanelRasterizer {
    /// Pixel density multiplier
    pub scale: u32,
    pub jpeg_quality: u8,
}

impl Default for PanelRasterizer {
    fn default() -> Self {
        Self {
            scale: 2,
            jpeg_quality: 90,
        }
    }
}

impl PanelRasterizer {
    fn panel_height(rows: u32) -> u32 {
        PADDING * 4 + BANNER_HEIGHT + GAUGE_HEIGHT + rows * (ROW_HEIGHT + ROW_GAP)
    }

    fn draw(&self, report: &ForensicReport) -> RgbImage {
        let findings = report.aligned_findings();
        let rows = findings.len() as u32;
        let s = self.scale.max(1);
        let mut canvas = Canvas::new(PANEL_WIDTH * s, Self::panel_height(rows) * s, s);

        let verdict = if report.is_authentic { GREEN } else { RED };
        let inner = PANEL_WIDTH - 2 * PADDING;

        canvas.fill(PADDING, PADDING, inner, BANNER_HEIGHT, verdict);
        // Dark strip marks the confidence level inside the banner.
        let marks = match report.confidence_level {
            vsight_models::ConfidenceLevel::High => 3,
            vsight_models::ConfidenceLevel::Medium => 2,
            vsight_models::ConfidenceLevel::Low => 1,
        };
        for i in 0..marks {
            canvas.fill(PADDING + 12 + i * 14, PADDING + 18, 10, 12, INK);
        }

        let gauge_y = PADDING * 2 + BANNER_HEIGHT;
        canvas.fill(PADDING, gauge_y, inner, GAUGE_HEIGHT, TRACK);
        canvas.fill(
            PADDING,
            gauge_y,
            proportion(inner, f64::from(report.score)),
            GAUGE_HEIGHT,
            score_color(report.score),
        );

        let mut y = gauge_y + GAUGE_HEIGHT + PADDING;
        let bar_x = PADDING + SWATCH + 8;
        let bar_width = inner - SWATCH - 8;
        for finding in &findings {
            let color = status_color(finding.status);
            canvas.fill(PADDING, y, SWATCH, ROW_HEIGHT, color);
            canvas.fill(bar_x, y + 3, bar_width, ROW_HEIGHT - 6, TRACK);
            canvas.fill(
                bar_x,
                y + 3,
                proportion(bar_width, finding.confidence),
                ROW_HEIGHT - 6,
                color,
            );
            y += ROW_HEIGHT + ROW_GAP;
        }

        canvas.image
    }
}

impl ReportRasterizer for PanelRasterizer {
    fn rasterize(&self, report: &ForensicReport) -> DossierResult<RasterImage> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(DossierError::rasterize(format!(
                "JPEG quality {} outside 1-100",
                self.jpeg_quality
            )));
        }

        let image = self.draw(report);
        let (width, height) = image.dimensions();

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality).encode(
            image.as_raw(),
            width,
            height,
            ColorType::Rgb8,
        )?;

        Ok(RasterImage {
            jpeg,
            width,
            height,
        })
    }
}

pub fn status_color(status: FindingStatus) -> [u8; 3] {
    match status {
        FindingStatus::Pass => GREEN,
        FindingStatus::Warn => AMBER,
        FindingStatus::Fail => RED,
    }
}

fn score_color(score: u8) -> [u8; 3] {
    match score {
        80..=u8::MAX => GREEN,
        50..=79 => AMBER,
        _ => RED,
    }
}

/// Width covering `percent` of `full`, clamped to the track.
fn proportion(full: u32, percent: f64) -> u32 {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    (f64::from(full) * percent / 100.0).round() as u32
}

/// Pixel buffer addressed in unscaled panel units.
struct Canvas {
    image: RgbImage,
    scale: u32,
}

impl Canvas {
    fn new(width: u32, height: u32, scale: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(BACKGROUND)),
            scale,
        }
    }

    fn fill(&mut self, x: u32, y: u32, width: u32, height: u32, color: [u8; 3]) {
        let (max_x, max_y) = self.image.dimensions();
        let x0 = (x * self.scale).min(max_x);
        let y0 = (y * self.scale).min(max_y);
        let x1 = ((x + width) * self.scale).min(max_x);
        let y1 = ((y + height) * self.scale).min(max_y);

        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, Rgb(color));
            }
        }
    }
}
