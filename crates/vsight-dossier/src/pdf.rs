//! PDF assembly with `lopdf`.
//!
//! Uses the built-in Helvetica faces so no font program is embedded. The
//! page-1 raster goes in as a DCTDecode image XObject, which is the JPEG
//! byte stream unchanged.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::DossierResult;
use crate::layout::{
    pdf_safe, LogLine, Watermark, BODY_FONT_SIZE, LEADING, MARGIN, PAGE_HEIGHT, PAGE_WIDTH,
};
use crate::raster::RasterImage;

const BOLD_FONT: &str = "F1";
const REGULAR_FONT: &str = "F2";
const WATERMARK_STATE: &str = "GS1";
const PANEL_IMAGE: &str = "Im1";

const WATERMARK_OPACITY: f32 = 0.2;
const WATERMARK_SIZE: f32 = 40.0;
const AGENT_SIZE: f32 = 24.0;
/// Rough Helvetica-Bold advance per character, as a fraction of the size.
const BOLD_ADVANCE: f32 = 0.66;

const INK: [u8; 3] = [15, 23, 42];
const MUTED: [u8; 3] = [100, 116, 139];

/// Inputs for one dossier document.
pub struct DocumentParts<'a> {
    pub raster: &'a RasterImage,
    pub log_pages: &'a [Vec<LogLine>],
    pub watermark: Watermark,
    pub operator_id: &'a str,
}

/// Assemble the PDF and return its bytes and page count.
pub fn assemble(parts: &DocumentParts<'_>) -> DossierResult<(Vec<u8>, usize)> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let gs_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => real(WATERMARK_OPACITY),
        "CA" => real(WATERMARK_OPACITY),
    });
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(parts.raster.width),
            "Height" => i64::from(parts.raster.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        },
        parts.raster.jpeg.clone(),
    ));

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            BOLD_FONT => bold_id,
            REGULAR_FONT => regular_id,
        },
        "ExtGState" => dictionary! {
            WATERMARK_STATE => gs_id,
        },
        "XObject" => dictionary! {
            PANEL_IMAGE => image_id,
        },
    });

    let total_pages = 1 + parts.log_pages.len();
    let mut page_contents = vec![panel_page(parts.raster)];
    for (index, lines) in parts.log_pages.iter().enumerate() {
        page_contents.push(log_page(lines, index + 2, total_pages));
    }

    let mut kids = Vec::with_capacity(total_pages);
    for mut operations in page_contents {
        operations.extend(watermark_ops(&parts.watermark, parts.operator_id));
        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = add_page(&mut doc, pages_id, content_id, resources_id);
        kids.push(Object::from(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total_pages as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok((bytes, total_pages))
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    content_id: ObjectId,
    resources_id: ObjectId,
) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![real(0.0), real(0.0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
    })
}

/// Page 1: the panel at full width, top aligned.
fn panel_page(raster: &RasterImage) -> Vec<Operation> {
    let height = PAGE_WIDTH * raster.aspect_ratio();
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(PAGE_WIDTH),
                real(0.0),
                real(0.0),
                real(height),
                real(0.0),
                real(PAGE_HEIGHT - height),
            ],
        ),
        Operation::new("Do", vec![name(PANEL_IMAGE)]),
        Operation::new("Q", vec![]),
    ]
}

fn log_page(lines: &[LogLine], page_number: usize, total_pages: usize) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        fill_color(INK),
        Operation::new("TL", vec![real(LEADING)]),
        Operation::new("Td", vec![real(MARGIN), real(PAGE_HEIGHT - MARGIN)]),
    ];

    for line in lines {
        let font = if line.emphasis { BOLD_FONT } else { REGULAR_FONT };
        ops.push(Operation::new("Tf", vec![name(font), real(BODY_FONT_SIZE)]));
        ops.push(Operation::new("Tj", vec![text(&line.text)]));
        ops.push(Operation::new("T*", vec![]));
    }
    ops.push(Operation::new("ET", vec![]));

    // Footer
    ops.extend([
        Operation::new("BT", vec![]),
        fill_color(MUTED),
        Operation::new("Tf", vec![name(REGULAR_FONT), real(8.0)]),
        Operation::new("Td", vec![real(MARGIN), real(MARGIN / 2.0)]),
        Operation::new(
            "Tj",
            vec![text(&format!("VeriSight dossier | page {} of {}", page_number, total_pages))],
        ),
        Operation::new("ET", vec![]),
    ]);

    ops
}

/// Verdict and operator stamped at 45 degrees through the page centre.
fn watermark_ops(watermark: &Watermark, operator_id: &str) -> Vec<Operation> {
    let agent = format!("AGENT: {}", operator_id);
    let (cx, cy) = (PAGE_WIDTH / 2.0, PAGE_HEIGHT / 2.0);
    // Perpendicular offset so the agent line sits under the verdict.
    let offset = 44.0 * std::f32::consts::FRAC_1_SQRT_2;

    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![name(WATERMARK_STATE)]),
        fill_color(watermark.color),
    ];
    ops.extend(rotated_text(watermark.text, WATERMARK_SIZE, cx, cy));
    ops.extend(rotated_text(&agent, AGENT_SIZE, cx + offset, cy - offset));
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Text centred on (cx, cy) along a 45 degree baseline.
fn rotated_text(content: &str, size: f32, cx: f32, cy: f32) -> Vec<Operation> {
    let cos = std::f32::consts::FRAC_1_SQRT_2;
    let sin = cos;
    let half_width = content.chars().count() as f32 * size * BOLD_ADVANCE / 2.0;

    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![name(BOLD_FONT), real(size)]),
        Operation::new(
            "Tm",
            vec![
                real(cos),
                real(sin),
                real(-sin),
                real(cos),
                real(cx - cos * half_width),
                real(cy - sin * half_width),
            ],
        ),
        Operation::new("Tj", vec![text(content)]),
        Operation::new("ET", vec![]),
    ]
}

fn fill_color(rgb: [u8; 3]) -> Operation {
    Operation::new(
        "rg",
        rgb.iter().map(|c| real(f32::from(*c) / 255.0)).collect(),
    )
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn text(value: &str) -> Object {
    Object::string_literal(pdf_safe(value))
}
