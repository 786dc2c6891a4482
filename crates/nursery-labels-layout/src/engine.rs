//! Document assembly: queue to pages of draw commands, plus the calibration sheet.

use core::fmt;
use std::iter::Peekable;
use std::sync::{Arc, Mutex};

use nursery_labels::{paginate, ConfigError, LabelSlot, Paginated, PrintConfig, PrintItem};

use crate::barcode::{BarcodeError, BarcodeRenderer};
use crate::content::{ContentLayout, ContentMetrics, LabelContent};
use crate::geometry::GeometryResolver;
use crate::label_ir::{
    BarcodeImage, DocumentKind, DrawCommand, LabelDocument, LabelPage, RectCommand, TextAlign,
    TextCommand, TextStyle,
};
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};

/// Outline stroke used on calibration pages, in inches.
pub const CALIBRATION_STROKE_WIDTH: f32 = 0.01;
/// Orientation marker printed above the grid on calibration pages.
pub const CALIBRATION_MARKER: &str = "TOP";

/// What to do when a label's SKU cannot be turned into a barcode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BarcodeFailurePolicy {
    /// Print the label without a barcode and report it.
    #[default]
    SkipBarcode,
    /// Abort the whole build.
    FailDocument,
}

/// Runtime diagnostics from document assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutDiagnostic {
    PageCompleted {
        page_number: usize,
        label_count: usize,
    },
    BarcodeSkipped {
        token: String,
        error: BarcodeError,
    },
}

type DiagnosticCallback = Arc<Mutex<Box<dyn FnMut(LayoutDiagnostic) + Send + 'static>>>;
type DiagnosticSink = Option<DiagnosticCallback>;

/// Label engine options.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabelEngineOptions {
    /// Sheet geometry.
    pub config: PrintConfig,
    /// In-label sizes and offsets.
    pub metrics: ContentMetrics,
    pub barcode_failure: BarcodeFailurePolicy,
}

impl LabelEngineOptions {
    /// Defaults with an explicit sheet config.
    pub fn for_config(config: PrintConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }
}

/// Document assembly error.
#[derive(Debug)]
pub enum LayoutError {
    /// The sheet config failed validation.
    InvalidConfig(ConfigError),
    /// A barcode failed under [`BarcodeFailurePolicy::FailDocument`].
    Barcode { token: String, source: BarcodeError },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(err) => write!(f, "invalid print config: {}", err),
            Self::Barcode { token, source } => {
                write!(f, "barcode for item '{}' failed: {}", token, source)
            }
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            Self::Barcode { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for LayoutError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}

/// Turns a print queue into sheets of draw commands.
#[derive(Clone)]
pub struct LabelEngine {
    opts: LabelEngineOptions,
    geometry: GeometryResolver,
    text_measurer: Arc<dyn TextMeasurer>,
    diagnostic_sink: DiagnosticSink,
}

impl fmt::Debug for LabelEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelEngine")
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl LabelEngine {
    /// Create an engine. Fails when `opts.config` does not validate.
    pub fn new(opts: LabelEngineOptions) -> Result<Self, LayoutError> {
        opts.config.validate()?;
        Ok(Self {
            geometry: GeometryResolver::new(opts.config),
            opts,
            text_measurer: Arc::new(HeuristicTextMeasurer),
            diagnostic_sink: None,
        })
    }

    /// Measure names with the renderer's own metrics.
    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.text_measurer = measurer;
        self
    }

    pub fn options(&self) -> &LabelEngineOptions {
        &self.opts
    }

    pub fn geometry(&self) -> &GeometryResolver {
        &self.geometry
    }

    /// Register or replace the diagnostics sink.
    pub fn set_diagnostic_sink<F>(&mut self, sink: F)
    where
        F: FnMut(LayoutDiagnostic) + Send + 'static,
    {
        self.diagnostic_sink = Some(Arc::new(Mutex::new(Box::new(sink))));
    }

    fn emit_diagnostic(&self, diagnostic: LayoutDiagnostic) {
        let Some(sink) = &self.diagnostic_sink else {
            return;
        };
        if let Ok(mut sink) = sink.lock() {
            sink(diagnostic);
        }
    }

    /// Lay out every queued label into a letter-size document.
    ///
    /// An empty queue (or one whose counts are all zero) yields zero pages.
    pub fn build_document(
        &self,
        items: &[PrintItem],
        barcodes: &mut dyn BarcodeRenderer,
    ) -> Result<LabelDocument, LayoutError> {
        let mut doc = LabelDocument::letter(DocumentKind::Labels);
        for page in self.pages(items, barcodes) {
            doc.pages.push(page?);
        }
        log::debug!(
            "built label document: {} pages, {} labels",
            doc.page_count(),
            doc.label_count()
        );
        Ok(doc)
    }

    /// Lazily lay out pages. Each item is a finished page; dropping the
    /// iterator early discards the page in progress.
    pub fn pages<'a>(
        &'a self,
        items: &'a [PrintItem],
        barcodes: &'a mut dyn BarcodeRenderer,
    ) -> LabelPageIter<'a> {
        LabelPageIter {
            engine: self,
            labels: paginate(items).peekable(),
            barcodes,
            failed: false,
        }
    }

    /// One page of label outlines plus an orientation marker, for checking
    /// printer alignment against the label stock.
    pub fn build_calibration_document(&self) -> LabelDocument {
        let mut doc = LabelDocument::letter(DocumentKind::Calibration);
        let mut page = LabelPage::new(1);
        for area in self.geometry.page_boxes() {
            page.push_command(DrawCommand::Rect(RectCommand {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height,
                stroke_width: CALIBRATION_STROKE_WIDTH,
            }));
        }
        let style = TextStyle::bold(12.0);
        page.push_command(DrawCommand::Text(TextCommand {
            x: doc.page_width / 2.0,
            y: ((self.opts.config.page_padding_top - style.size_in()) / 2.0).max(0.0),
            text: CALIBRATION_MARKER.to_string(),
            style,
            align: TextAlign::Center,
            max_width: None,
        }));
        doc.pages.push(page);
        doc
    }

    fn place_label(
        &self,
        page: &mut LabelPage,
        slot: LabelSlot,
        item: &PrintItem,
        barcodes: &mut dyn BarcodeRenderer,
    ) -> Result<(), LayoutError> {
        let area = self.geometry.slot_box(slot);
        let content = LabelContent::from_item(item);
        let barcode = match content.sku.as_deref() {
            Some(sku) => self.render_barcode(&item.token, sku, barcodes)?,
            None => None,
        };
        ContentLayout::new(&self.opts.metrics, self.text_measurer.as_ref()).layout(
            &content,
            &area,
            barcode,
            page,
        );
        page.label_count += 1;
        Ok(())
    }

    fn render_barcode(
        &self,
        token: &str,
        sku: &str,
        barcodes: &mut dyn BarcodeRenderer,
    ) -> Result<Option<BarcodeImage>, LayoutError> {
        let error = match barcodes.render_barcode(sku) {
            Ok(image) => return Ok(Some(image)),
            Err(error) => error,
        };
        match self.opts.barcode_failure {
            BarcodeFailurePolicy::FailDocument => Err(LayoutError::Barcode {
                token: token.to_string(),
                source: error,
            }),
            BarcodeFailurePolicy::SkipBarcode => {
                log::warn!("skipping barcode for item '{}': {}", token, error);
                self.emit_diagnostic(LayoutDiagnostic::BarcodeSkipped {
                    token: token.to_string(),
                    error,
                });
                Ok(None)
            }
        }
    }
}

/// Iterator returned by [`LabelEngine::pages`].
pub struct LabelPageIter<'a> {
    engine: &'a LabelEngine,
    labels: Peekable<Paginated<'a>>,
    barcodes: &'a mut dyn BarcodeRenderer,
    failed: bool,
}

impl Iterator for LabelPageIter<'_> {
    type Item = Result<LabelPage, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (first, _) = *self.labels.peek()?;
        let mut page = LabelPage::new(first.page_index + 1);
        while let Some((slot, item)) = self
            .labels
            .next_if(|(slot, _)| slot.page_index == first.page_index)
        {
            if let Err(err) = self
                .engine
                .place_label(&mut page, slot, item, &mut *self.barcodes)
            {
                self.failed = true;
                return Some(Err(err));
            }
        }
        self.engine.emit_diagnostic(LayoutDiagnostic::PageCompleted {
            page_number: page.page_number,
            label_count: page.label_count,
        });
        Some(Ok(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label_ir::ImageSource;
    use nursery_labels::LABELS_PER_PAGE;

    /// Always succeeds with a fixed three-module image.
    #[derive(Default)]
    struct StubBarcodes {
        calls: Vec<String>,
    }

    impl BarcodeRenderer for StubBarcodes {
        fn render_barcode(&mut self, data: &str) -> Result<BarcodeImage, BarcodeError> {
            self.calls.push(data.to_string());
            Ok(BarcodeImage {
                data: data.to_string(),
                modules: vec![true, false, true],
            })
        }
    }

    /// Rejects every SKU.
    struct BrokenBarcodes;

    impl BarcodeRenderer for BrokenBarcodes {
        fn render_barcode(&mut self, _data: &str) -> Result<BarcodeImage, BarcodeError> {
            Err(BarcodeError::Backend("offline".to_string()))
        }
    }

    fn engine() -> LabelEngine {
        LabelEngine::new(LabelEngineOptions::default()).expect("default config is valid")
    }

    fn aloe_and_fern() -> Vec<PrintItem> {
        vec![
            PrintItem::new("aloe", "Aloe", "A1", "4.99").with_count(2),
            PrintItem::new("fern", "Fern", "", "").with_count(1),
        ]
    }

    #[test]
    fn new_rejects_invalid_config() {
        let opts = LabelEngineOptions::for_config(PrintConfig {
            label_width: 0.0,
            ..PrintConfig::default()
        });
        assert!(matches!(
            LabelEngine::new(opts),
            Err(LayoutError::InvalidConfig(ConfigError::NotPositive { .. }))
        ));
    }

    #[test]
    fn empty_queue_builds_zero_pages() {
        let mut barcodes = StubBarcodes::default();
        let doc = engine()
            .build_document(&[], &mut barcodes)
            .expect("build should succeed");
        assert_eq!(doc.page_count(), 0);
        let zero = [PrintItem::new("t", "Aloe", "A1", "").with_count(0)];
        let doc = engine()
            .build_document(&zero, &mut barcodes)
            .expect("build should succeed");
        assert_eq!(doc.page_count(), 0);
        assert!(barcodes.calls.is_empty());
    }

    #[test]
    fn renders_one_barcode_per_labelled_sku() {
        let mut barcodes = StubBarcodes::default();
        let doc = engine()
            .build_document(&aloe_and_fern(), &mut barcodes)
            .expect("build should succeed");
        assert_eq!(barcodes.calls, ["A1", "A1"]);
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].label_count, 3);
        assert_eq!(doc.pages[0].page_number, 1);
    }

    #[test]
    fn page_breaks_follow_capacity() {
        let items = [PrintItem::new("t", "Moss", "", "").with_count(61)];
        let mut barcodes = StubBarcodes::default();
        let doc = engine()
            .build_document(&items, &mut barcodes)
            .expect("build should succeed");
        let counts: Vec<usize> = doc.pages.iter().map(|page| page.label_count).collect();
        assert_eq!(counts, [LABELS_PER_PAGE, LABELS_PER_PAGE, 1]);
        let numbers: Vec<usize> = doc.pages.iter().map(|page| page.page_number).collect();
        assert_eq!(numbers, [1, 2, 3]);
    }

    #[test]
    fn skip_policy_drops_barcode_and_reports_it() {
        let mut engine = engine();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.set_diagnostic_sink(move |diag| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(diag);
            }
        });
        let items = [PrintItem::new("aloe", "Aloe", "A1", "4.99").with_count(1)];
        let doc = engine
            .build_document(&items, &mut BrokenBarcodes)
            .expect("skip policy keeps building");
        let page = &doc.pages[0];
        assert!(page
            .images()
            .all(|image| !matches!(image.source, ImageSource::Barcode(_))));
        assert_eq!(page.texts().count(), 2);

        let seen = seen.lock().expect("diagnostics lock");
        assert_eq!(
            *seen,
            [
                LayoutDiagnostic::BarcodeSkipped {
                    token: "aloe".to_string(),
                    error: BarcodeError::Backend("offline".to_string()),
                },
                LayoutDiagnostic::PageCompleted {
                    page_number: 1,
                    label_count: 1,
                },
            ]
        );
    }

    #[test]
    fn fail_policy_aborts_with_item_token() {
        let engine = LabelEngine::new(LabelEngineOptions {
            barcode_failure: BarcodeFailurePolicy::FailDocument,
            ..LabelEngineOptions::default()
        })
        .expect("default config is valid");
        let err = engine
            .build_document(&aloe_and_fern(), &mut BrokenBarcodes)
            .expect_err("barcode failure should abort");
        match err {
            LayoutError::Barcode { token, source } => {
                assert_eq!(token, "aloe");
                assert_eq!(source, BarcodeError::Backend("offline".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn page_iterator_stops_after_failure() {
        let engine = LabelEngine::new(LabelEngineOptions {
            barcode_failure: BarcodeFailurePolicy::FailDocument,
            ..LabelEngineOptions::default()
        })
        .expect("default config is valid");
        let items = aloe_and_fern();
        let mut barcodes = BrokenBarcodes;
        let mut pages = engine.pages(&items, &mut barcodes);
        assert!(matches!(pages.next(), Some(Err(LayoutError::Barcode { .. }))));
        assert!(pages.next().is_none());
    }

    #[test]
    fn lazy_pages_can_stop_early() {
        let items = [PrintItem::new("t", "Moss", "", "").with_count(95)];
        let mut barcodes = StubBarcodes::default();
        let engine = engine();
        let first: Vec<LabelPage> = engine
            .pages(&items, &mut barcodes)
            .take(2)
            .collect::<Result<_, _>>()
            .expect("pages should lay out");
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|page| page.label_count == LABELS_PER_PAGE));
    }

    #[test]
    fn calibration_page_has_outlines_and_marker_only() {
        let doc = engine().build_calibration_document();
        assert_eq!(doc.kind, DocumentKind::Calibration);
        assert_eq!(doc.page_count(), 1);
        let page = &doc.pages[0];
        assert_eq!(page.rects().count(), LABELS_PER_PAGE);
        assert_eq!(page.images().count(), 0);
        let texts: Vec<&str> = page.texts().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, [CALIBRATION_MARKER]);
        let marker = page.texts().next().expect("marker drawn");
        assert_eq!(marker.align, TextAlign::Center);
        assert!((marker.x - 4.25).abs() < 1e-5);
    }

    #[test]
    fn layout_error_display_names_the_item() {
        let err = LayoutError::Barcode {
            token: "aloe".to_string(),
            source: BarcodeError::Empty,
        };
        assert_eq!(
            err.to_string(),
            "barcode for item 'aloe' failed: barcode data is empty"
        );
    }
}
