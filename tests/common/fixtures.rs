use nursery_labels::{PrintItem, PrintQueue};

pub const SPRING_QUEUE: &str = "tests/fixtures/spring_queue.json";

/// Load a queue export fixture relative to the crate root.
pub fn load_queue(path: &str) -> PrintQueue {
    let full = format!("{}/{}", env!("CARGO_MANIFEST_DIR"), path);
    let json = std::fs::read_to_string(&full).unwrap_or_else(|e| panic!("read {}: {}", full, e));
    let items: Vec<PrintItem> =
        serde_json::from_str(&json).unwrap_or_else(|e| panic!("parse {}: {}", full, e));
    PrintQueue::from_items(items)
}

/// A queue large enough to span many sheets, mixing barcoded and plain items.
pub fn bulk_queue(labels_per_item: u32) -> PrintQueue {
    PrintQueue::from_items((0..20).map(|idx| {
        let sku = if idx % 3 == 0 {
            String::new()
        } else {
            format!("{:06}", 100_000 + idx)
        };
        let price = if idx % 4 == 0 {
            String::new()
        } else {
            format!("{}.49", idx + 2)
        };
        PrintItem::new(format!("tok-{idx}"), format!("Perennial No. {idx}"), sku, price)
            .with_count(labels_per_item)
    }))
}
