//! embedded-graphics renderer for `nursery-labels-layout` pages.

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

use embedded_graphics::{
    mono_font::{
        ascii::{
            FONT_10X20, FONT_6X13_BOLD, FONT_6X9, FONT_7X14, FONT_7X14_BOLD, FONT_9X18,
            FONT_9X18_BOLD,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use nursery_labels_layout::{
    wrap_text_lines, BarcodeImage, DrawCommand, ImageCommand, ImageSource, LabelDocument,
    LabelPage, RectCommand, TextAlign, TextCommand, TextMeasurer, TextStyle,
};
use std::sync::Arc;

/// Screen-preview resolution.
pub const DEFAULT_DPI: u32 = 96;

/// Monochrome bitmap construction failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BitmapError {
    /// Width or height is zero or overflows.
    InvalidDimensions,
    /// Packed pixel data length does not match dimensions.
    InvalidPixelData,
    /// The encoded image could not be decoded.
    Decode(String),
}

impl core::fmt::Display for BitmapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions => write!(f, "bitmap dimensions are invalid"),
            Self::InvalidPixelData => write!(f, "bitmap pixel data length mismatch"),
            Self::Decode(msg) => write!(f, "bitmap decode failed: {}", msg),
        }
    }
}

impl std::error::Error for BitmapError {}

/// Pre-decoded monochrome bitmap stored in packed row-major bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonochromeBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl MonochromeBitmap {
    /// Construct a bitmap from packed row-major bits, MSB first.
    pub fn from_packed_bits(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        if width == 0 || height == 0 {
            return Err(BitmapError::InvalidDimensions);
        }
        let Some(required_bytes) = Self::required_bytes(width, height) else {
            return Err(BitmapError::InvalidDimensions);
        };
        if pixels.len() != required_bytes {
            return Err(BitmapError::InvalidPixelData);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode a PNG. Opaque pixels darker than mid-gray become ink;
    /// transparent pixels stay blank.
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, BitmapError> {
        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|err| BitmapError::Decode(err.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("decoding {}x{} logo", width, height);
        let Some(required_bytes) = Self::required_bytes(width, height) else {
            return Err(BitmapError::InvalidDimensions);
        };
        let mut pixels = vec![0u8; required_bytes];
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let [r, g, b, alpha] = pixel.0;
            let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            if alpha >= 128 && luma < 128.0 {
                let bit_index = y as usize * width as usize + x as usize;
                pixels[bit_index / 8] |= 1 << (7 - (bit_index % 8));
            }
        }
        Self::from_packed_bits(width, height, pixels)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    fn required_bytes(width: u32, height: u32) -> Option<usize> {
        let pixels = width.checked_mul(height)?;
        Some((pixels.div_ceil(8)) as usize)
    }

    /// True when the pixel at `(x, y)` is ink. Out of range is blank.
    pub fn pixel_is_on(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let bit_index = y as usize * self.width as usize + x as usize;
        let byte_index = bit_index / 8;
        let bit_in_byte = 7 - (bit_index % 8);
        ((self.pixels[byte_index] >> bit_in_byte) & 0x01) == 1
    }
}

/// Mono font used for a label text style at a given resolution.
fn font_for(style: &TextStyle, dpi: u32) -> &'static MonoFont<'static> {
    let size_px = style.size_in() * dpi as f32;
    if style.bold {
        if size_px < 14.0 {
            &FONT_6X13_BOLD
        } else if size_px < 17.0 {
            &FONT_7X14_BOLD
        } else {
            &FONT_9X18_BOLD
        }
    } else if size_px < 12.0 {
        &FONT_6X9
    } else if size_px < 17.0 {
        &FONT_7X14
    } else if size_px < 20.0 {
        &FONT_9X18
    } else {
        &FONT_10X20
    }
}

fn run_width_px(font: &MonoFont<'_>, text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    chars * font.character_size.width + (chars - 1) * font.character_spacing
}

/// `TextMeasurer` that reports the widths [`EgRenderer`] will draw with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EgTextMeasurer {
    dpi: u32,
}

impl EgTextMeasurer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi: dpi.max(1) }
    }

    /// Shared trait object for `LabelEngine::with_text_measurer`.
    pub fn shared(dpi: u32) -> Arc<dyn TextMeasurer> {
        Arc::new(Self::new(dpi))
    }
}

impl Default for EgTextMeasurer {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}

impl TextMeasurer for EgTextMeasurer {
    fn measure_text_width(&self, text: &str, style: &TextStyle) -> f32 {
        run_width_px(font_for(style, self.dpi), text) as f32 / self.dpi as f32
    }
}

/// Fallback behavior when no logo bitmap is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFallbackPolicy {
    /// Draw only the outline of the logo box.
    OutlineOnly,
    /// Draw the outline with a compact "LOGO" tag when it fits.
    OutlineWithLabel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EgRenderConfig {
    /// Pixels per inch.
    pub dpi: u32,
    /// Clear display before drawing page.
    pub clear_first: bool,
    /// Policy used when the logo is unavailable.
    pub image_fallback: ImageFallbackPolicy,
}

impl Default for EgRenderConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            clear_first: true,
            image_fallback: ImageFallbackPolicy::OutlineWithLabel,
        }
    }
}

/// Draw-command executor for embedded-graphics targets.
#[derive(Clone, Debug, Default)]
pub struct EgRenderer {
    cfg: EgRenderConfig,
    logo: Option<MonochromeBitmap>,
}

impl EgRenderer {
    /// Create renderer with config.
    pub fn new(cfg: EgRenderConfig) -> Self {
        Self { cfg, logo: None }
    }

    /// Register or replace the logo bitmap.
    pub fn set_logo(&mut self, bitmap: MonochromeBitmap) {
        self.logo = Some(bitmap);
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    /// Measurer matching this renderer's fonts and resolution.
    pub fn text_measurer(&self) -> EgTextMeasurer {
        EgTextMeasurer::new(self.cfg.dpi)
    }

    fn dpi(&self) -> u32 {
        self.cfg.dpi.max(1)
    }

    fn px(&self, inches: f32) -> i32 {
        (inches * self.dpi() as f32).round() as i32
    }

    fn px_len(&self, inches: f32) -> u32 {
        self.px(inches).max(0) as u32
    }

    /// Pixel size of a full document page.
    pub fn page_size(&self, doc: &LabelDocument) -> Size {
        Size::new(self.px_len(doc.page_width), self.px_len(doc.page_height))
    }

    /// Render a page to a draw target.
    pub fn render_page<D>(&self, page: &LabelPage, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if self.cfg.clear_first {
            display.clear(BinaryColor::Off)?;
        }
        for cmd in &page.commands {
            self.draw_command(display, cmd)?;
        }
        Ok(())
    }

    fn draw_command<D>(&self, display: &mut D, cmd: &DrawCommand) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        match cmd {
            DrawCommand::Text(text) => self.draw_text(display, text),
            DrawCommand::Image(image) => self.draw_image(display, image),
            DrawCommand::Rect(rect) => self.draw_rect(display, rect),
        }
    }

    fn draw_rect<D>(&self, display: &mut D, rect: &RectCommand) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let stroke = self.px_len(rect.stroke_width).max(1);
        Rectangle::new(
            Point::new(self.px(rect.x), self.px(rect.y)),
            Size::new(self.px_len(rect.width).max(1), self.px_len(rect.height).max(1)),
        )
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, stroke))
        .draw(display)
    }

    fn draw_text<D>(&self, display: &mut D, cmd: &TextCommand) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let font = font_for(&cmd.style, self.dpi());
        let style = MonoTextStyle::new(font, BinaryColor::On);
        let advance = self
            .px(cmd.style.line_advance_in())
            .max(font.character_size.height as i32);
        let x = self.px(cmd.x);
        let top = self.px(cmd.y);

        let Some(max_width) = cmd.max_width else {
            return self.draw_line(display, &cmd.text, x, top, cmd.align, style);
        };
        let measurer = self.text_measurer();
        let lines = wrap_text_lines(&cmd.text, max_width, |run| {
            measurer.measure_text_width(run, &cmd.style)
        });
        for (i, line) in lines.iter().enumerate() {
            self.draw_line(display, line, x, top + i as i32 * advance, cmd.align, style)?;
        }
        Ok(())
    }

    fn draw_line<D>(
        &self,
        display: &mut D,
        text: &str,
        anchor_x: i32,
        top: i32,
        align: TextAlign,
        style: MonoTextStyle<'static, BinaryColor>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if text.is_empty() {
            return Ok(());
        }
        let width = run_width_px(style.font, text) as i32;
        let x = match align {
            TextAlign::Left => anchor_x,
            TextAlign::Right => anchor_x - width,
            TextAlign::Center => anchor_x - width / 2,
        };
        Text::with_baseline(text, Point::new(x, top), style, Baseline::Top).draw(display)?;
        Ok(())
    }

    fn draw_image<D>(&self, display: &mut D, image: &ImageCommand) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let area = Rectangle::new(
            Point::new(self.px(image.x), self.px(image.y)),
            Size::new(self.px_len(image.width), self.px_len(image.height)),
        );
        match &image.source {
            ImageSource::Barcode(code) => draw_barcode(display, code, area),
            ImageSource::Logo => match &self.logo {
                Some(bitmap) => draw_bitmap(display, bitmap, area),
                None => self.draw_logo_fallback(display, area),
            },
        }
    }

    fn draw_logo_fallback<D>(&self, display: &mut D, area: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        Rectangle::new(
            area.top_left,
            Size::new(area.size.width.max(1), area.size.height.max(1)),
        )
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(display)?;
        if self.cfg.image_fallback != ImageFallbackPolicy::OutlineWithLabel {
            return Ok(());
        }
        let style = MonoTextStyle::new(&FONT_6X9, BinaryColor::On);
        let tag = "LOGO";
        if run_width_px(style.font, tag) + 4 > area.size.width
            || style.font.character_size.height + 4 > area.size.height
        {
            return Ok(());
        }
        Text::with_baseline(tag, area.top_left + Point::new(2, 2), style, Baseline::Top)
            .draw(display)?;
        Ok(())
    }
}

/// Stretch barcode modules across `area`, one filled rectangle per bar.
fn draw_barcode<D>(display: &mut D, code: &BarcodeImage, area: Rectangle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let modules = code.module_count() as i64;
    if modules == 0 || area.size.width == 0 || area.size.height == 0 {
        return Ok(());
    }
    let width = area.size.width as i64;
    let module_edge = |module: usize| (module as i64 * width / modules) as i32;
    for (start, run) in code.bars() {
        let x0 = module_edge(start);
        let x1 = module_edge(start + run).max(x0 + 1);
        Rectangle::new(
            area.top_left + Point::new(x0, 0),
            Size::new((x1 - x0) as u32, area.size.height),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(display)?;
    }
    Ok(())
}

/// Scale `bitmap` to fit `area` preserving aspect ratio, centered.
fn draw_bitmap<D>(display: &mut D, bitmap: &MonochromeBitmap, area: Rectangle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let target_w = area.size.width.max(1);
    let target_h = area.size.height.max(1);
    let (scaled_w, scaled_h) =
        fit_bitmap_inside(bitmap.width(), bitmap.height(), target_w, target_h);

    let origin_x = area.top_left.x + (target_w as i32 - scaled_w as i32) / 2;
    let origin_y = area.top_left.y + (target_h as i32 - scaled_h as i32) / 2;

    for dy in 0..scaled_h {
        let src_y = ((dy as u64 * bitmap.height() as u64) / scaled_h as u64) as u32;
        let y = origin_y + dy as i32;
        display.draw_iter((0..scaled_w).filter_map(|dx| {
            let src_x = ((dx as u64 * bitmap.width() as u64) / scaled_w as u64) as u32;
            bitmap
                .pixel_is_on(src_x, src_y)
                .then_some(Pixel(Point::new(origin_x + dx as i32, y), BinaryColor::On))
        }))?;
    }
    Ok(())
}

fn fit_bitmap_inside(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let src_w = src_w.max(1);
    let src_h = src_h.max(1);
    let target_w = target_w.max(1);
    let target_h = target_h.max(1);

    let width_limited = (target_w as u64 * src_h as u64) <= (target_h as u64 * src_w as u64);
    if width_limited {
        let scaled_h = ((target_w as u64 * src_h as u64) / src_w as u64).max(1) as u32;
        (target_w, scaled_h.min(target_h))
    } else {
        let scaled_w = ((target_h as u64 * src_w as u64) / src_h as u64).max(1) as u32;
        (scaled_w.min(target_w), target_h)
    }
}
