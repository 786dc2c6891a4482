//! Printable HTML/SVG preview for `nursery-labels-layout` documents.
//!
//! Each page becomes one inline SVG whose user units are inches, so the
//! browser's print dialog reproduces the sheet at physical size.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use nursery_labels::SheetSummary;
use nursery_labels_layout::{
    wrap_text_lines, BarcodeImage, DrawCommand, HeuristicTextMeasurer, ImageCommand, ImageSource,
    LabelDocument, LabelPage, RectCommand, TextAlign, TextCommand, TextMeasurer,
};
use serde::Serialize;

/// Encoded logo embedded into every page as a data URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoAsset {
    data_uri: String,
}

impl LogoAsset {
    pub fn png(bytes: &[u8]) -> Self {
        Self::with_mime("image/png", bytes)
    }

    pub fn with_mime(mime: &str, bytes: &[u8]) -> Self {
        Self {
            data_uri: format!("data:{};base64,{}", mime, BASE64.encode(bytes)),
        }
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }
}

/// JSON payload embedded next to the SVG pages.
#[derive(Clone, Debug, Serialize)]
pub struct PreviewPayload<'a> {
    pub labels: usize,
    pub sheets: usize,
    pub wasted_labels: usize,
    pub document: &'a LabelDocument,
}

impl<'a> PreviewPayload<'a> {
    pub fn new(document: &'a LabelDocument, summary: SheetSummary) -> Self {
        Self {
            labels: summary.labels,
            sheets: summary.sheets,
            wasted_labels: summary.wasted_labels,
            document,
        }
    }
}

/// SVG writer. Wraps text with the measurer the layout used, since SVG
/// `<text>` does not wrap.
pub struct SvgRenderer<'a> {
    logo: Option<&'a LogoAsset>,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(logo: Option<&'a LogoAsset>, measurer: &'a dyn TextMeasurer) -> Self {
        Self { logo, measurer }
    }

    /// One `<svg>` element sized `page_width` x `page_height` inches.
    pub fn page_svg(&self, page: &LabelPage, page_width: f32, page_height: f32) -> String {
        let mut out = String::with_capacity(256 + page.commands.len() * 160);
        let _ = write!(
            out,
            r#"<svg class="sheet" xmlns="http://www.w3.org/2000/svg" width="{w}in" height="{h}in" viewBox="0 0 {w} {h}" data-page="{n}">"#,
            w = num(page_width),
            h = num(page_height),
            n = page.page_number
        );
        for cmd in &page.commands {
            match cmd {
                DrawCommand::Rect(rect) => push_rect(&mut out, rect),
                DrawCommand::Text(text) => self.push_text(&mut out, text),
                DrawCommand::Image(image) => self.push_image(&mut out, image),
            }
        }
        out.push_str("</svg>");
        out
    }

    fn push_text(&self, out: &mut String, cmd: &TextCommand) {
        let anchor = match cmd.align {
            TextAlign::Left => "start",
            TextAlign::Right => "end",
            TextAlign::Center => "middle",
        };
        let weight = if cmd.style.bold { "bold" } else { "normal" };
        let lines = match cmd.max_width {
            Some(max_width) => wrap_text_lines(&cmd.text, max_width, |run| {
                self.measurer.measure_text_width(run, &cmd.style)
            }),
            None => vec![cmd.text.clone()],
        };
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = cmd.y + i as f32 * cmd.style.line_advance_in();
            let _ = write!(
                out,
                r#"<text x="{}" y="{}" font-size="{}" font-weight="{}" text-anchor="{}" dominant-baseline="hanging" font-family="Helvetica, Arial, sans-serif">{}</text>"#,
                num(cmd.x),
                num(y),
                num(cmd.style.size_in()),
                weight,
                anchor,
                escape_xml(line)
            );
        }
    }

    fn push_image(&self, out: &mut String, image: &ImageCommand) {
        match &image.source {
            ImageSource::Barcode(code) => push_barcode(out, image, code),
            ImageSource::Logo => match self.logo {
                Some(logo) => {
                    let _ = write!(
                        out,
                        r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet" href="{}"/>"#,
                        num(image.x),
                        num(image.y),
                        num(image.width),
                        num(image.height),
                        logo.data_uri()
                    );
                }
                None => {
                    let _ = write!(
                        out,
                        r#"<rect class="logo-missing" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="black" stroke-width="0.01" stroke-dasharray="0.04 0.03"/>"#,
                        num(image.x),
                        num(image.y),
                        num(image.width),
                        num(image.height)
                    );
                }
            },
        }
    }
}

fn push_rect(out: &mut String, rect: &RectCommand) {
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="black" stroke-width="{}"/>"#,
        num(rect.x),
        num(rect.y),
        num(rect.width),
        num(rect.height),
        num(rect.stroke_width)
    );
}

fn push_barcode(out: &mut String, image: &ImageCommand, code: &BarcodeImage) {
    let modules = code.module_count();
    if modules == 0 {
        return;
    }
    let module_width = image.width / modules as f32;
    let _ = write!(
        out,
        r#"<g class="barcode" data-sku="{}" fill="black" shape-rendering="crispEdges">"#,
        escape_xml(&code.data)
    );
    for (start, run) in code.bars() {
        let _ = write!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}"/>"#,
            num(image.x + start as f32 * module_width),
            num(image.y),
            num(run as f32 * module_width),
            num(image.height)
        );
    }
    out.push_str("</g>");
}

/// Fixed-precision inches, trailing zeros trimmed.
fn num(value: f32) -> String {
    let mut s = format!("{:.4}", value);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Escape text for XML content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Standalone printable HTML for `doc`.
///
/// Names are wrapped with [`HeuristicTextMeasurer`]; build the document with
/// the same measurer so wrapping decisions agree.
pub fn document_html(
    doc: &LabelDocument,
    summary: SheetSummary,
    logo: Option<&LogoAsset>,
) -> Result<String, serde_json::Error> {
    let payload = PreviewPayload::new(doc, summary);
    let data_json = serde_json::to_string(&payload)?;
    let safe_json = data_json.replace("</", "<\\/");

    let measurer = HeuristicTextMeasurer;
    let svg = SvgRenderer::new(logo, &measurer);
    let mut pages = String::new();
    for page in &doc.pages {
        pages.push_str(&svg.page_svg(page, doc.page_width, doc.page_height));
        pages.push('\n');
    }

    Ok(format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>nursery label sheets</title>
  <style>
    @page {{ size: letter; margin: 0; }}
    body {{ margin: 0; background: #e7e4dc; font-family: sans-serif; }}
    .summary {{ margin: 16px auto; width: {width}in; color: #3c372c; }}
    .sheet {{ display: block; margin: 0 auto 24px; background: #fff; box-shadow: 0 2px 10px rgba(0, 0, 0, 0.2); }}
    @media print {{
      body {{ background: none; }}
      .summary {{ display: none; }}
      .sheet {{ margin: 0; box-shadow: none; break-after: page; }}
    }}
  </style>
</head>
<body>
  <p class="summary">{summary}</p>
{pages}  <script type="application/json" id="label-document">{json}</script>
</body>
</html>
"#,
        width = num(doc.page_width),
        summary = escape_xml(&summary.to_string()),
        pages = pages,
        json = safe_json
    ))
}
