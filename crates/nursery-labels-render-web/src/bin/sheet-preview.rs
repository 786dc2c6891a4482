use std::env;
use std::path::Path;
use std::process::ExitCode;

use nursery_labels::{PrintConfig, PrintItem, PrintQueue, SheetSummary};
use nursery_labels_layout::{Code128, LabelEngine, LabelEngineOptions};
use nursery_labels_render_web::{document_html, LogoAsset};

const DEFAULT_OUT_PATH: &str = "target/sheet-preview/index.html";

#[derive(Clone, Debug, PartialEq, Eq)]
struct Args {
    queue_path: Option<String>,
    config_path: Option<String>,
    logo_path: Option<String>,
    out_path: String,
    calibration: bool,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let config = match &cli.config_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read config '{}': {}", path, e))?;
            PrintConfig::from_json_str(&json).map_err(|e| e.to_string())?
        }
        None => PrintConfig::default(),
    };
    let engine =
        LabelEngine::new(LabelEngineOptions::for_config(config)).map_err(|e| e.to_string())?;

    let (doc, summary) = if cli.calibration {
        (
            engine.build_calibration_document(),
            SheetSummary::for_label_count(0),
        )
    } else {
        let path = cli
            .queue_path
            .as_deref()
            .ok_or_else(|| "a queue file is required unless --calibration is set".to_string())?;
        let queue = load_queue(path)?;
        let doc = engine
            .build_document(queue.items(), &mut Code128::new())
            .map_err(|e| e.to_string())?;
        (doc, queue.summary())
    };

    let logo = match &cli.logo_path {
        Some(path) => {
            let bytes = std::fs::read(path)
                .map_err(|e| format!("failed to read logo '{}': {}", path, e))?;
            Some(LogoAsset::png(&bytes))
        }
        None => None,
    };

    if cli.out_path.is_empty() {
        return Err("--out must not be empty".to_string());
    }
    if let Some(parent) = Path::new(&cli.out_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    let html = document_html(&doc, summary, logo.as_ref()).map_err(|e| e.to_string())?;
    std::fs::write(&cli.out_path, html).map_err(|e| e.to_string())?;

    println!(
        "wrote sheet preview to {} (pages={}, {})",
        cli.out_path,
        doc.page_count(),
        summary
    );
    Ok(())
}

/// Queue files are a JSON array of point-of-sale item rows.
fn load_queue(path: &str) -> Result<PrintQueue, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read queue '{}': {}", path, e))?;
    parse_queue(&json).map_err(|e| format!("invalid queue '{}': {}", path, e))
}

fn parse_queue(json: &str) -> Result<PrintQueue, serde_json::Error> {
    let items: Vec<PrintItem> = serde_json::from_str(json)?;
    Ok(PrintQueue::from_items(items))
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let has_positional_queue = args.get(1).is_some_and(|v| !v.starts_with("--"));

    let mut cfg = Args {
        queue_path: has_positional_queue.then(|| args[1].clone()),
        config_path: None,
        logo_path: None,
        out_path: DEFAULT_OUT_PATH.to_string(),
        calibration: false,
    };

    let mut i = if has_positional_queue { 2usize } else { 1usize };
    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--out requires a value".to_string())?;
                cfg.out_path = v.clone();
                i += 2;
            }
            "--config" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                cfg.config_path = Some(v.clone());
                i += 2;
            }
            "--logo" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--logo requires a value".to_string())?;
                cfg.logo_path = Some(v.clone());
                i += 2;
            }
            "--calibration" => {
                cfg.calibration = true;
                i += 1;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"sheet-preview - printable HTML preview of nursery label sheets

USAGE:
  cargo run -p nursery-labels-render-web --bin sheet-preview -- [queue.json] [options]

OPTIONS:
  --out <file>       output HTML path (default: target/sheet-preview/index.html)
  --config <file>    sheet config JSON (labelWidth, labelHeight, pagePaddingTop,
                     pagePaddingLeft, columnGap); missing fields use stock defaults
  --logo <png>       logo image embedded on every label
  --calibration      print label outlines only (queue file not needed)

QUEUE FILE:
  JSON array of rows: {"Token", "Item Name", "SKU", "Price", "count"}
"#
}
