//! PDF rendering of a laid-out report.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::layout::{Item, Layout, PageGeometry, Placement};
use super::{ReportDocument, Section};
use crate::error_handling::ExportError;

const REPORT_TITLE: &str = "Website Analysis Report";
const FOOTER_TEXT: &str = "Generated by Website Analyzer";

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

const TITLE_SIZE: f32 = 22.0;
const SUBTITLE_SIZE: f32 = 12.0;
const HEADER_SIZE: f32 = 14.0;
const CELL_SIZE: f32 = 9.0;
const FOOTER_SIZE: f32 = 9.0;
const CELL_PADDING: f32 = 4.0;

/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;

type Rgb = (f32, f32, f32);
const PRIMARY: Rgb = (0.102, 0.102, 0.102);
const ACCENT: Rgb = (0.333, 0.333, 0.333);
const BODY: Rgb = (0.157, 0.157, 0.157);
const MUTED: Rgb = (0.588, 0.588, 0.588);
const RULE: Rgb = (0.85, 0.85, 0.85);
const WHITE: Rgb = (1.0, 1.0, 1.0);

/// Renders `layout` of `document` as PDF bytes.
pub fn render_pdf(document: &ReportDocument, layout: &Layout) -> Result<Vec<u8>, ExportError> {
    let geometry = layout.geometry;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));

    // One image object per embedded chart, shared by reference.
    let images: Vec<Option<ObjectId>> = document
        .sections
        .iter()
        .map(|s| {
            s.chart.as_ref().map(|chart| {
                let dict = dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(chart.width()),
                    "Height" => i64::from(chart.height()),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8_i64,
                };
                doc.add_object(Stream::new(dict, chart.rgb().to_vec()))
            })
        })
        .collect();

    let page_count = layout.page_count();
    let mut kids = Vec::with_capacity(page_count);
    for (number, page) in layout.pages.iter().enumerate() {
        let mut canvas = Canvas::new(geometry);
        let mut xobjects = Dictionary::new();

        if number == 0 {
            canvas.title_band(&document.generated_at);
        }
        for placement in &page.placements {
            let Some(section) = document.sections.get(placement.section) else {
                continue;
            };
            match &placement.item {
                Item::Header => canvas.section_header(placement, section.title()),
                Item::Chart { width } => {
                    if let Some(image_id) = images.get(placement.section).copied().flatten() {
                        let name = format!("Im{}", placement.section);
                        canvas.image(placement, *width, &name);
                        xobjects.set(name, image_id);
                    }
                }
                Item::Table { rows, with_head } => {
                    canvas.table(placement, section, rows.clone(), *with_head);
                }
            }
        }
        canvas.footer(number + 1, page_count);

        let content = Content {
            operations: canvas.ops,
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let resources = dictionary! {
            "Font" => dictionary! {
                REGULAR => regular_id,
                BOLD => bold_id,
            },
            "XObject" => xobjects,
        };
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
            "MediaBox" => vec![0_i64.into(), 0_i64.into(), geometry.width.into(), geometry.height.into()],
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Content-stream builder working in top-down page coordinates.
struct Canvas {
    geometry: PageGeometry,
    ops: Vec<Operation>,
}

impl Canvas {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            ops: Vec::new(),
        }
    }

    /// PDF y coordinate of a top-down offset.
    fn y(&self, top: f32) -> f32 {
        self.geometry.height - top
    }

    fn fill(&mut self, color: Rgb) {
        self.ops.push(Operation::new(
            "rg",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
    }

    fn rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: Rgb) {
        self.fill(color);
        let y = self.y(top + height);
        self.ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    fn rule(&mut self, x: f32, top: f32, width: f32) {
        let y = self.y(top);
        self.ops.push(Operation::new(
            "RG",
            vec![RULE.0.into(), RULE.1.into(), RULE.2.into()],
        ));
        self.ops.push(Operation::new("w", vec![0.5_f32.into()]));
        self.ops.push(Operation::new("m", vec![x.into(), y.into()]));
        self.ops
            .push(Operation::new("l", vec![(x + width).into(), y.into()]));
        self.ops.push(Operation::new("S", vec![]));
    }

    /// Draws `text` with its baseline at `baseline` (top-down).
    fn text(&mut self, font: &str, size: f32, color: Rgb, x: f32, baseline: f32, text: &str) {
        self.fill(color);
        let y = self.y(baseline);
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        self.ops.push(Operation::new("Tj", vec![encode_text(text)]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn title_band(&mut self, generated_at: &str) {
        let g = self.geometry;
        self.rect(0.0, 0.0, g.width, g.title_band, PRIMARY);
        self.text(BOLD, TITLE_SIZE, WHITE, g.margin, 45.0, REPORT_TITLE);
        self.text(
            REGULAR,
            SUBTITLE_SIZE,
            WHITE,
            g.margin,
            65.0,
            &format!("Generated on: {generated_at}"),
        );
    }

    fn section_header(&mut self, placement: &Placement, title: &str) {
        let g = self.geometry;
        let baseline = placement.top + placement.height - 10.0;
        self.text(BOLD, HEADER_SIZE, ACCENT, g.margin, baseline, title);
        self.rule(g.margin, placement.bottom() - 4.0, g.content_width());
    }

    fn image(&mut self, placement: &Placement, width: f32, name: &str) {
        let x = self.geometry.margin;
        let y = self.y(placement.bottom());
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                width.into(),
                0_i64.into(),
                0_i64.into(),
                placement.height.into(),
                x.into(),
                y.into(),
            ],
        ));
        self.ops
            .push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    fn table(
        &mut self,
        placement: &Placement,
        section: &Section,
        rows: std::ops::Range<usize>,
        with_head: bool,
    ) {
        let Some(table) = &section.table else {
            return;
        };
        let g = self.geometry;
        let widths = table.column_widths(g.content_width());
        let mut top = placement.top;

        if with_head {
            if let Some(head) = &table.head {
                self.rect(g.margin, top, g.content_width(), g.row_height, PRIMARY);
                self.row(top, &widths, head, (BOLD, BOLD), WHITE);
                top += g.row_height;
            }
        }
        // Head-less tables show their first column as labels.
        let fonts = if table.head.is_none() {
            (BOLD, REGULAR)
        } else {
            (REGULAR, REGULAR)
        };
        for row in table.rows.get(rows).unwrap_or_default() {
            self.row(top, &widths, row, fonts, BODY);
            self.rule(g.margin, top + g.row_height, g.content_width());
            top += g.row_height;
        }
    }

    /// Draws one table row; `fonts` is (first column, other columns).
    fn row(
        &mut self,
        top: f32,
        widths: &[f32],
        cells: &[String],
        fonts: (&str, &str),
        color: Rgb,
    ) {
        let baseline = top + self.geometry.row_height - 5.0;
        let mut x = self.geometry.margin;
        for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
            let font = if i == 0 { fonts.0 } else { fonts.1 };
            let text = fit_text(cell, width - 2.0 * CELL_PADDING, CELL_SIZE);
            self.text(font, CELL_SIZE, color, x + CELL_PADDING, baseline, &text);
            x += width;
        }
    }

    fn footer(&mut self, page: usize, pages: usize) {
        let g = self.geometry;
        let baseline = g.height - 30.0;
        self.text(REGULAR, FOOTER_SIZE, MUTED, g.margin, baseline, FOOTER_TEXT);
        let label = format!("Page {page} / {pages}");
        let x = g.width - g.margin - text_width(&label, FOOTER_SIZE);
        self.text(REGULAR, FOOTER_SIZE, MUTED, x, baseline, &label);
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH
}

/// Cuts `text` to fit `width` points, ending in `...` when shortened.
fn fit_text(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * GLYPH_WIDTH)).floor().max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }
    let mut cut: String = text.chars().take(max_chars - 3).collect();
    cut.push_str("...");
    cut
}

/// Literal string in the fonts' WinAnsi encoding; characters outside
/// Latin-1 become `?`.
fn encode_text(text: &str) -> Object {
    let bytes = text
        .chars()
        .map(|c| match u32::from(c) {
            0x20..=0x7e | 0xa0..=0xff => u32::from(c) as u8,
            0x09 | 0x0a | 0x0d => b' ',
            _ => b'?',
        })
        .collect();
    Object::String(bytes, StringFormat::Literal)
}
