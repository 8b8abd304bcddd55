//! Page geometry, watermark selection and the paginated findings log.

use vsight_models::{ForensicReport, SessionContext};

use crate::raster::{GREEN, RED};

/// A4 portrait in PDF points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

pub const MARGIN: f32 = 56.0;
pub const BODY_FONT_SIZE: f32 = 10.0;
pub const LEADING: f32 = 14.0;

/// Text lines that fit between the top and bottom margins at `LEADING`.
pub const LINES_PER_PAGE: usize = 52;

/// Characters per wrapped line at `BODY_FONT_SIZE`.
pub const WRAP_COLUMNS: usize = 92;

/// Diagonal verdict stamp applied to every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    pub text: &'static str,
    pub color: [u8; 3],
}

impl Watermark {
    pub fn for_report(report: &ForensicReport) -> Self {
        if report.is_authentic {
            Self {
                text: "VERIFIED AUTHENTIC",
                color: GREEN,
            }
        } else {
            Self {
                text: "MANIPULATION DETECTED",
                color: RED,
            }
        }
    }
}

/// One line of the findings log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub emphasis: bool,
}

impl LogLine {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: false,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: true,
        }
    }

    fn blank() -> Self {
        Self::plain("")
    }
}

/// Build the textual findings log for a report.
pub fn findings_log(report: &ForensicReport, session: &SessionContext) -> Vec<LogLine> {
    let meta = &report.metadata;
    let mut lines = vec![
        LogLine::heading("VERISIGHT FORENSIC DOSSIER"),
        LogLine::blank(),
        LogLine::plain(format!("Verdict: {}", report.verdict_label())),
        LogLine::plain(format!("Integrity score: {}/100", report.score)),
        LogLine::plain(format!("Confidence: {}", report.confidence_level.as_str())),
        LogLine::plain(format!("Operator: {}", session.operator_id)),
        LogLine::plain(format!(
            "Duration: {:.1} s | Resolution: {} | Frames: {} | Audio: {}",
            meta.duration_seconds,
            meta.resolution_label,
            meta.frames_processed,
            if meta.audio_processed {
                "analyzed"
            } else {
                "not available"
            }
        )),
        LogLine::blank(),
        LogLine::heading("SUMMARY"),
    ];

    if report.summary.trim().is_empty() {
        lines.push(LogLine::plain("No summary provided."));
    } else {
        lines.extend(wrap(&report.summary, WRAP_COLUMNS).into_iter().map(LogLine::plain));
    }

    lines.push(LogLine::blank());
    lines.push(LogLine::heading("FINDINGS LOG"));

    if report.analysis.is_empty() {
        lines.push(LogLine::plain("No findings reported."));
    }

    for finding in &report.analysis {
        lines.push(LogLine::heading(format!(
            "[{}] {} ({:.0}%)",
            finding.status, finding.category, finding.confidence
        )));
        lines.extend(
            wrap(&finding.detail, WRAP_COLUMNS - 4)
                .into_iter()
                .map(|l| LogLine::plain(format!("    {}", l))),
        );
    }

    lines
}

/// Split lines into pages of at most `per_page` lines.
pub fn paginate(lines: Vec<LogLine>, per_page: usize) -> Vec<Vec<LogLine>> {
    let per_page = per_page.max(1);
    let mut pages = Vec::new();
    let mut lines = lines.into_iter().peekable();

    while lines.peek().is_some() {
        pages.push(lines.by_ref().take(per_page).collect());
    }

    pages
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word: Vec<char> = word.chars().collect();
        for chunk in word.chunks(width) {
            let chunk: String = chunk.iter().collect();
            let needed = if current.is_empty() {
                chunk.chars().count()
            } else {
                current.chars().count() + 1 + chunk.chars().count()
            };

            if needed > width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&chunk);
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Reduce text to what the standard Type1 fonts can show.
pub fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c,
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            _ => '?',
        })
        .collect()
}
