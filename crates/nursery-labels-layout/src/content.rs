//! Per-label content placement.

use nursery_labels::{compose_primary_line, sanitize_label_text, PrintItem};

use crate::geometry::LabelBox;
use crate::label_ir::{
    BarcodeImage, DrawCommand, ImageCommand, ImageSource, LabelPage, TextAlign, TextCommand,
    TextStyle,
};
use crate::measure::TextMeasurer;

/// Fixed physical sizes and offsets used inside a label's content box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentMetrics {
    pub logo_width: f32,
    pub logo_height: f32,
    pub barcode_width: f32,
    pub barcode_height: f32,
    /// Space between the price's right edge and the barcode.
    pub price_gap: f32,
    /// Price baseline box offset below the content top.
    pub price_top: f32,
    /// Space between the logo and the name.
    pub name_gap: f32,
    /// Extra drop for names that fit on one line.
    pub single_line_offset: f32,
    pub price_style: TextStyle,
    pub name_style: TextStyle,
}

impl ContentMetrics {
    /// Sizes tuned for 2.625" x 1" address labels.
    pub const STANDARD: Self = Self {
        logo_width: 0.75,
        logo_height: 0.3,
        barcode_width: 1.0,
        barcode_height: 0.3,
        price_gap: 0.05,
        price_top: 0.05,
        name_gap: 0.05,
        single_line_offset: 0.1,
        price_style: TextStyle::bold(12.0),
        name_style: TextStyle::regular(9.0),
    };
}

impl Default for ContentMetrics {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Text and barcode payload derived from one queued item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelContent {
    /// Sanitized `"$<price> - <name>"` or name.
    pub primary_line: String,
    /// Sanitized price, without the dollar sign.
    pub price: Option<String>,
    /// SKU as entered; the barcode encoder decides what it accepts.
    pub sku: Option<String>,
}

impl LabelContent {
    pub fn from_item(item: &PrintItem) -> Self {
        let name = sanitize_label_text(&item.name);
        let price = item
            .price()
            .map(sanitize_label_text)
            .filter(|price| !price.is_empty());
        Self {
            primary_line: compose_primary_line(&name, price.as_deref()),
            price,
            sku: item.sku().map(str::to_string),
        }
    }
}

/// Places label content into a content box.
pub struct ContentLayout<'a> {
    metrics: &'a ContentMetrics,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> ContentLayout<'a> {
    pub fn new(metrics: &'a ContentMetrics, measurer: &'a dyn TextMeasurer) -> Self {
        Self { metrics, measurer }
    }

    /// Downward offset for the name line: only single-line names get one.
    pub fn name_offset(&self, primary_line: &str, max_width: f32) -> f32 {
        let lines =
            self.measurer
                .wrapped_line_count(primary_line, max_width, &self.metrics.name_style);
        if lines > 1 {
            0.0
        } else {
            self.metrics.single_line_offset
        }
    }

    /// Append one label's commands to `page`: barcode, price, logo, name.
    ///
    /// `barcode` is the rendered SKU, or `None` when the label has no
    /// barcode (no SKU, or rendering was skipped).
    pub fn layout(
        &self,
        content: &LabelContent,
        area: &LabelBox,
        barcode: Option<BarcodeImage>,
        page: &mut LabelPage,
    ) {
        let m = self.metrics;
        let top = area.content_y();
        let width = area.content_width();
        let offset = self.name_offset(&content.primary_line, width);

        let mut price_right = area.content_right();
        if let Some(image) = barcode {
            let x = area.content_right() - m.barcode_width;
            page.push_command(DrawCommand::Image(ImageCommand {
                source: ImageSource::Barcode(image),
                x,
                y: top,
                width: m.barcode_width,
                height: m.barcode_height,
            }));
            price_right = x - m.price_gap;
        }

        if let Some(price) = &content.price {
            page.push_command(DrawCommand::Text(TextCommand {
                x: price_right,
                y: top + m.price_top,
                text: format!("${}", price),
                style: m.price_style,
                align: TextAlign::Right,
                max_width: None,
            }));
        }

        page.push_command(DrawCommand::Image(ImageCommand {
            source: ImageSource::Logo,
            x: area.content_x(),
            y: top,
            width: m.logo_width,
            height: m.logo_height,
        }));

        page.push_command(DrawCommand::Text(TextCommand {
            x: area.content_x(),
            y: top + m.logo_height + m.name_gap + offset,
            text: content.primary_line.clone(),
            style: m.name_style,
            align: TextAlign::Left,
            max_width: Some(width),
        }));
    }
}
