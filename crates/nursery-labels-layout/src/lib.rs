//! Label sheet layout for `nursery-labels`: geometry, per-label content, and
//! document assembly into backend-agnostic draw commands.

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

mod barcode;
mod content;
mod engine;
mod geometry;
mod label_ir;
mod measure;

pub use barcode::{BarcodeError, BarcodeRenderer, Code128};
pub use content::{ContentLayout, ContentMetrics, LabelContent};
pub use engine::{
    BarcodeFailurePolicy, LabelEngine, LabelEngineOptions, LabelPageIter, LayoutDiagnostic,
    LayoutError, CALIBRATION_MARKER, CALIBRATION_STROKE_WIDTH,
};
pub use geometry::{GeometryResolver, LabelBox, LABEL_PADDING};
pub use label_ir::{
    BarRuns, BarcodeImage, DocumentKind, DrawCommand, ImageCommand, ImageSource, LabelDocument,
    LabelPage, RectCommand, TextAlign, TextCommand, TextStyle, PAGE_HEIGHT_IN, PAGE_WIDTH_IN,
};
pub use measure::{wrap_text_lines, HeuristicTextMeasurer, TextMeasurer};
