//! DHAT heap profiler for nursery-labels.
//!
//! Profiles allocation patterns across the label pipeline:
//! expand -> paginate -> layout -> rasterize.
//!
//! Usage:
//!   cargo run -p nursery-labels-heap-profile --release -- [OPTIONS] [QUEUE_FILES...]
//!
//! Outputs dhat-<phase>-<name>.json files in the output directory (default: target/memory).
//! Open in https://nnethercote.github.io/dh_view/dh_view.html

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use nursery_labels::{paginate, PrintItem, PrintQueue};
use nursery_labels_embedded_graphics::{EgRenderConfig, EgRenderer, EgTextMeasurer};
use nursery_labels_layout::{Code128, LabelEngine, LabelEngineOptions};

const DEFAULT_SYNTHETIC_LABELS: u32 = 600;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Paginate,
    Layout,
    Stream,
    Raster,
}

impl Phase {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "paginate" => Some(Self::Paginate),
            "layout" => Some(Self::Layout),
            "stream" => Some(Self::Stream),
            "raster" => Some(Self::Raster),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Paginate => "paginate",
            Self::Layout => "layout",
            Self::Stream => "stream",
            Self::Raster => "raster",
        }
    }
}

/// Draw target that only counts lit pixels, so rasterizing costs no frame buffer.
struct CountingDisplay {
    size: Size,
    on_pixels: usize,
}

impl OriginDimensions for CountingDisplay {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for CountingDisplay {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(_, color) in pixels {
            if color == BinaryColor::On {
                self.on_pixels += 1;
            }
        }
        Ok(())
    }
}

fn synthetic_queue(labels: u32) -> PrintQueue {
    let names = [
        "Aloe Vera",
        "Boston Fern",
        "Blue Star Creeper Groundcover",
        "Dwarf Mondo Grass",
        "Japanese Maple 'Bloodgood'",
    ];
    let per_item = (labels / names.len() as u32).max(1);
    PrintQueue::from_items(names.iter().enumerate().map(|(idx, name)| {
        let sku = if idx % 2 == 0 {
            format!("SKU-{idx:04}")
        } else {
            String::new()
        };
        PrintItem::new(format!("t{idx}"), *name, sku, format!("{}.99", idx + 3))
            .with_count(per_item)
    }))
}

fn load_queue(path: &Path) -> PrintQueue {
    let json = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
    let items: Vec<PrintItem> = serde_json::from_str(&json)
        .unwrap_or_else(|e| panic!("parse {}: {}", path.display(), e));
    PrintQueue::from_items(items)
}

fn profile_queue(name: &str, queue: &PrintQueue, phase: Phase) {
    let engine = LabelEngine::new(LabelEngineOptions::default())
        .unwrap_or_else(|e| panic!("engine {}: {}", name, e));
    let mut barcodes = Code128::new();

    match phase {
        Phase::Paginate => {
            let last_page = paginate(queue.items())
                .map(|(slot, _)| slot.page_index)
                .last();
            eprintln!("  {}: last page index {:?}", name, last_page);
        }
        Phase::Layout => {
            let doc = engine
                .build_document(queue.items(), &mut barcodes)
                .unwrap_or_else(|e| panic!("layout {}: {}", name, e));
            eprintln!("  {}: {} pages", name, doc.page_count());
        }
        Phase::Stream => {
            // Page-at-a-time: only one page is alive at once.
            let mut pages = 0usize;
            for page in engine.pages(queue.items(), &mut barcodes) {
                let page = page.unwrap_or_else(|e| panic!("layout {}: {}", name, e));
                pages = page.page_number;
            }
            eprintln!("  {}: streamed {} pages", name, pages);
        }
        Phase::Raster => {
            let cfg = EgRenderConfig::default();
            let engine = engine.with_text_measurer(EgTextMeasurer::shared(cfg.dpi));
            let renderer = EgRenderer::new(cfg);
            let mut lit = 0usize;
            for page in engine.pages(queue.items(), &mut barcodes) {
                let page = page.unwrap_or_else(|e| panic!("layout {}: {}", name, e));
                let mut display = CountingDisplay {
                    size: Size::new(816, 1056),
                    on_pixels: 0,
                };
                if renderer.render_page(&page, &mut display).is_ok() {
                    lit += display.on_pixels;
                }
            }
            eprintln!("  {}: {} lit pixels", name, lit);
        }
    }
}

fn short_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

fn usage() {
    eprintln!("Usage: heap-profile [OPTIONS] [QUEUE_FILES...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!(
        "  --phase <paginate|layout|stream|raster>  Pipeline phase to profile (default: layout)"
    );
    eprintln!("  --labels <N>          Synthetic queue size when no files are given (default: 600)");
    eprintln!("  --out-dir <DIR>       Output directory for dhat JSON (default: target/memory)");
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut phase = Phase::Layout;
    let mut out_dir = PathBuf::from("target/memory");
    let mut labels = DEFAULT_SYNTHETIC_LABELS;
    let mut files: Vec<PathBuf> = Vec::with_capacity(4);
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--phase" => {
                i += 1;
                phase = args
                    .get(i)
                    .and_then(|v| Phase::from_str(v))
                    .unwrap_or_else(|| {
                        usage();
                        std::process::exit(1);
                    });
            }
            "--labels" => {
                i += 1;
                labels = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| {
                        usage();
                        std::process::exit(1);
                    });
            }
            "--out-dir" => {
                i += 1;
                out_dir = args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    usage();
                    std::process::exit(1);
                });
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            other => files.push(PathBuf::from(other)),
        }
        i += 1;
    }

    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output dir {}: {}", out_dir.display(), e);
        std::process::exit(1);
    });

    let phase_name = phase.name();
    let queues: Vec<(String, PrintQueue)> = if files.is_empty() {
        vec![(format!("synthetic{labels}"), synthetic_queue(labels))]
    } else {
        files
            .iter()
            .map(|path| (short_name(path), load_queue(path)))
            .collect()
    };

    for (name, queue) in &queues {
        let json_path = out_dir.join(format!("dhat-{phase_name}-{name}.json"));
        eprintln!(
            "heap-profile: phase={}, queue={} ({} labels), out={}",
            phase_name,
            name,
            queue.total_labels(),
            json_path.display()
        );
        let _profiler = dhat::Profiler::builder().file_name(json_path).build();
        profile_queue(name, queue, phase);
    }
}
