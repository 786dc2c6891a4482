//! Print queue, sheet pagination, and label data model for nursery shelf labels.
//!
//! A print queue is an ordered list of [`PrintItem`]s, each with a label count.
//! The queue is expanded into one entry per physical label and split into
//! sheets of [`LABELS_PER_PAGE`] labels (3 columns by 10 rows).
//!
//! ```rust
//! use nursery_labels::{paginate, PrintItem, SheetSummary};
//!
//! let items = vec![
//!     PrintItem::new("t-aloe", "Aloe", "A1", "4.99").with_count(2),
//!     PrintItem::new("t-fern", "Fern", "", "").with_count(1),
//! ];
//! let slots: Vec<_> = paginate(&items).map(|(slot, _)| slot).collect();
//! assert_eq!(slots.len(), 3);
//! assert!(slots.iter().all(|slot| slot.page_index == 0));
//! assert_eq!(SheetSummary::for_items(&items).wasted_labels, 27);
//! ```
//!
//! Drawing commands for a sheet are produced by the `nursery-labels-layout`
//! crate.

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

pub mod config;
pub mod expand;
pub mod item;
pub mod paginate;
pub mod queue;
pub mod text;

pub use config::{ConfigError, PrintConfig, LABELS_PER_PAGE, LABEL_COLUMNS, LABEL_ROWS};
pub use expand::{expand, ExpandedLabels};
pub use item::{ItemEdit, PrintItem};
pub use paginate::{paginate, LabelSlot, Paginated, SheetSummary};
pub use queue::{PrintQueue, QueueError};
pub use text::{compose_primary_line, sanitize_label_text, validate_price, PriceFormatError};
