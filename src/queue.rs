//! Ordered print queue.

use core::fmt;
use serde::{Deserialize, Deserializer, Serialize};

use crate::item::{ItemEdit, PrintItem};
use crate::paginate::SheetSummary;

/// Ordered list of items to print, keyed by token.
///
/// Serializes as a plain item array. Deserializing goes through
/// [`PrintQueue::from_items`], so duplicate tokens are folded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PrintQueue {
    items: Vec<PrintItem>,
}

impl PrintQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from already-ordered items.
    ///
    /// Later duplicates of a token are folded into the first occurrence by
    /// summing their counts, so the token stays unique.
    pub fn from_items(items: impl IntoIterator<Item = PrintItem>) -> Self {
        let mut queue = Self::new();
        for item in items {
            match queue.position(&item.token) {
                Some(idx) => {
                    let existing = &mut queue.items[idx];
                    let merged = existing
                        .count
                        .unwrap_or(0)
                        .saturating_add(item.count.unwrap_or(0));
                    existing.count = Some(merged);
                }
                None => queue.items.push(item),
            }
        }
        queue
    }

    /// Queue a catalog item.
    ///
    /// A new token is appended with a count of one. A token already in the
    /// queue has its count incremented instead; an unset count becomes one.
    pub fn add(&mut self, item: PrintItem) {
        match self.position(&item.token) {
            Some(idx) => {
                let existing = &mut self.items[idx];
                existing.count = Some(existing.count.unwrap_or(0).saturating_add(1));
                log::debug!(
                    "incremented queued item {} to {:?}",
                    existing.token,
                    existing.count
                );
            }
            None => {
                self.items.push(PrintItem {
                    count: Some(1),
                    ..item
                });
            }
        }
    }

    /// Apply a single-field edit to the item with `token`.
    pub fn update(&mut self, token: &str, edit: ItemEdit) -> Result<(), QueueError> {
        let idx = self.require(token)?;
        edit.apply(&mut self.items[idx]);
        Ok(())
    }

    /// Remove and return the item with `token`.
    pub fn remove(&mut self, token: &str) -> Result<PrintItem, QueueError> {
        let idx = self.require(token)?;
        Ok(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, token: &str) -> Option<&PrintItem> {
        self.items.iter().find(|item| item.token == token)
    }

    /// Items in print order.
    pub fn items(&self) -> &[PrintItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total physical labels the queue expands to.
    pub fn total_labels(&self) -> usize {
        self.items.iter().map(PrintItem::label_count).sum()
    }

    /// Label, sheet, and waste counts for the current queue.
    pub fn summary(&self) -> SheetSummary {
        SheetSummary::for_label_count(self.total_labels())
    }

    fn position(&self, token: &str) -> Option<usize> {
        self.items.iter().position(|item| item.token == token)
    }

    fn require(&self, token: &str) -> Result<usize, QueueError> {
        self.position(token)
            .ok_or_else(|| QueueError::UnknownToken(token.to_string()))
    }
}

impl From<Vec<PrintItem>> for PrintQueue {
    fn from(items: Vec<PrintItem>) -> Self {
        Self::from_items(items)
    }
}

impl<'de> Deserialize<'de> for PrintQueue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<PrintItem>::deserialize(deserializer).map(Self::from)
    }
}

/// Queue lookup failure.
///
/// An edit or removal names a token that is not queued, meaning the caller's
/// view of the queue is out of sync with the queue itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueueError {
    UnknownToken(String),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownToken(token) => write!(f, "no queued item with token '{}'", token),
        }
    }
}

impl std::error::Error for QueueError {}
