//! Grid geometry: label slot -> physical position.

use nursery_labels::{LabelSlot, PrintConfig, LABELS_PER_PAGE, LABEL_COLUMNS};

/// Inset from a label's edge to where content drawing begins, on both axes.
pub const LABEL_PADDING: f32 = 0.1;

/// Physical box of one label plus its inset content area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelBox {
    /// Left edge of the label.
    pub x: f32,
    /// Top edge of the label.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LabelBox {
    /// Left edge of the content area.
    pub fn content_x(&self) -> f32 {
        self.x + LABEL_PADDING
    }

    /// Top edge of the content area.
    pub fn content_y(&self) -> f32 {
        self.y + LABEL_PADDING
    }

    /// Usable content width.
    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * LABEL_PADDING).max(0.0)
    }

    /// Usable content height.
    pub fn content_height(&self) -> f32 {
        (self.height - 2.0 * LABEL_PADDING).max(0.0)
    }

    /// Right edge of the content area.
    pub fn content_right(&self) -> f32 {
        self.content_x() + self.content_width()
    }
}

/// Maps grid positions to label boxes for one [`PrintConfig`].
///
/// Columns are separated by `column_gap`; rows are contiguous.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryResolver {
    config: PrintConfig,
}

impl GeometryResolver {
    pub fn new(config: PrintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    /// Box for grid position `index_within_page` (`0..LABELS_PER_PAGE`).
    pub fn label_box(&self, index_within_page: usize) -> LabelBox {
        let column = index_within_page % LABEL_COLUMNS;
        let row = index_within_page / LABEL_COLUMNS;
        let cfg = &self.config;
        LabelBox {
            x: cfg.page_padding_left + column as f32 * (cfg.label_width + cfg.column_gap),
            y: cfg.page_padding_top + row as f32 * cfg.label_height,
            width: cfg.label_width,
            height: cfg.label_height,
        }
    }

    /// Box for a paginated slot. The page index does not move the box; every
    /// page uses the same grid.
    pub fn slot_box(&self, slot: LabelSlot) -> LabelBox {
        self.label_box(slot.index_within_page)
    }

    /// Boxes for every grid position of one page, row-major.
    pub fn page_boxes(&self) -> impl Iterator<Item = LabelBox> + '_ {
        (0..LABELS_PER_PAGE).map(|index| self.label_box(index))
    }
}
