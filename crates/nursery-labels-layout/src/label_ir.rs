//! Draw-command IR handed to renderers.

use serde::Serialize;

/// Letter paper width in inches.
pub const PAGE_WIDTH_IN: f32 = 8.5;
/// Letter paper height in inches.
pub const PAGE_HEIGHT_IN: f32 = 11.0;

/// Backend-agnostic drawing primitive. Coordinates are inches from the
/// top-left corner of the page.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Draw a text run.
    Text(TextCommand),
    /// Draw an image (logo or barcode) into a box.
    Image(ImageCommand),
    /// Stroke a rectangle outline.
    Rect(RectCommand),
}

/// Horizontal anchoring of a text run relative to its `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// `x` is the left edge.
    #[default]
    Left,
    /// `x` is the right edge.
    Right,
    /// `x` is the horizontal center.
    Center,
}

/// Resolved text style passed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TextStyle {
    /// Font size in points.
    pub size_pt: f32,
    /// Bold face.
    pub bold: bool,
    /// Line advance as a multiple of `size_pt`.
    pub line_height: f32,
}

impl TextStyle {
    /// Regular face with 1.15 line spacing.
    pub const fn regular(size_pt: f32) -> Self {
        Self {
            size_pt,
            bold: false,
            line_height: 1.15,
        }
    }

    /// Bold face with 1.15 line spacing.
    pub const fn bold(size_pt: f32) -> Self {
        Self {
            size_pt,
            bold: true,
            line_height: 1.15,
        }
    }

    /// Font size in inches.
    pub fn size_in(&self) -> f32 {
        self.size_pt / 72.0
    }

    /// Vertical advance between wrapped lines, in inches.
    pub fn line_advance_in(&self) -> f32 {
        self.size_in() * self.line_height
    }
}

/// Text draw command.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextCommand {
    /// Anchor x; meaning depends on `align`.
    pub x: f32,
    /// Top of the first line.
    pub y: f32,
    /// Content. Printable ASCII only when produced by the label layout.
    pub text: String,
    pub style: TextStyle,
    pub align: TextAlign,
    /// Wrap width. `None` draws a single unwrapped run.
    pub max_width: Option<f32>,
}

/// One-dimensional barcode as a run of modules, left to right.
///
/// `true` is a dark bar module. Quiet zones are not included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BarcodeImage {
    /// Encoded payload.
    pub data: String,
    /// Module pattern, one entry per module.
    pub modules: Vec<bool>,
}

impl BarcodeImage {
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Maximal dark runs as `(start_module, width_in_modules)` pairs.
    pub fn bars(&self) -> BarRuns<'_> {
        BarRuns {
            modules: &self.modules,
            pos: 0,
        }
    }
}

/// Iterator over the dark runs of a [`BarcodeImage`].
#[derive(Clone, Debug)]
pub struct BarRuns<'a> {
    modules: &'a [bool],
    pos: usize,
}

impl Iterator for BarRuns<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.modules.len() && !self.modules[self.pos] {
            self.pos += 1;
        }
        if self.pos >= self.modules.len() {
            return None;
        }
        let start = self.pos;
        while self.pos < self.modules.len() && self.modules[self.pos] {
            self.pos += 1;
        }
        Some((start, self.pos - start))
    }
}

/// Image payload referenced by an [`ImageCommand`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ImageSource {
    /// The shop logo, resolved by the renderer.
    Logo,
    /// Barcode rendered during layout.
    Barcode(BarcodeImage),
}

/// Image draw command. The payload is stretched to fill the box.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageCommand {
    pub source: ImageSource,
    /// Left x.
    pub x: f32,
    /// Top y.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Rectangle outline command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RectCommand {
    /// Left x.
    pub x: f32,
    /// Top y.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Stroke width in inches.
    pub stroke_width: f32,
}

impl RectCommand {
    /// True when the interiors of `self` and `other` intersect.
    pub fn overlaps(&self, other: &RectCommand) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// One sheet of labels as draw commands.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LabelPage {
    /// 1-based page number.
    pub page_number: usize,
    /// Labels placed on this page.
    pub label_count: usize,
    /// Draw commands in paint order.
    pub commands: Vec<DrawCommand>,
}

impl LabelPage {
    const INITIAL_COMMAND_CAPACITY: usize = 16;

    /// Create an empty page.
    pub fn new(page_number: usize) -> Self {
        Self {
            page_number,
            label_count: 0,
            // Keep empty pages allocation-free.
            commands: Vec::with_capacity(0),
        }
    }

    /// Append a draw command.
    pub fn push_command(&mut self, cmd: DrawCommand) {
        if self.commands.capacity() == 0 {
            self.commands.reserve(Self::INITIAL_COMMAND_CAPACITY);
        }
        self.commands.push(cmd);
    }

    /// Text commands in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }

    /// Image commands in paint order.
    pub fn images(&self) -> impl Iterator<Item = &ImageCommand> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Image(image) => Some(image),
            _ => None,
        })
    }

    /// Rectangle commands in paint order.
    pub fn rects(&self) -> impl Iterator<Item = &RectCommand> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Rect(rect) => Some(rect),
            _ => None,
        })
    }
}

/// What a [`LabelDocument`] was built for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Item labels from a print queue.
    #[default]
    Labels,
    /// Label outlines only, for checking printer alignment.
    Calibration,
}

/// Multi-page document handed to a renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LabelDocument {
    pub kind: DocumentKind,
    /// Page width in inches.
    pub page_width: f32,
    /// Page height in inches.
    pub page_height: f32,
    pub pages: Vec<LabelPage>,
}

impl LabelDocument {
    /// Empty letter-size document.
    pub fn letter(kind: DocumentKind) -> Self {
        Self {
            kind,
            page_width: PAGE_WIDTH_IN,
            page_height: PAGE_HEIGHT_IN,
            pages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Labels across all pages.
    pub fn label_count(&self) -> usize {
        self.pages.iter().map(|page| page.label_count).sum()
    }
}
