//! Queue expansion: one entry per physical label.

use core::iter::FusedIterator;

use crate::item::PrintItem;

/// Expand `items` into one reference per label, in queue order.
///
/// Each item repeats `count` times back to back. Unset and zero counts
/// contribute nothing. The iterator borrows the queue and allocates nothing;
/// clone it to restart.
pub fn expand(items: &[PrintItem]) -> ExpandedLabels<'_> {
    ExpandedLabels::new(items)
}

/// Lazy label sequence produced by [`expand`].
#[derive(Clone, Debug)]
pub struct ExpandedLabels<'a> {
    items: &'a [PrintItem],
    item_index: usize,
    emitted_for_item: usize,
    remaining: usize,
}

impl<'a> ExpandedLabels<'a> {
    fn new(items: &'a [PrintItem]) -> Self {
        Self {
            items,
            item_index: 0,
            emitted_for_item: 0,
            remaining: items.iter().map(PrintItem::label_count).sum(),
        }
    }
}

impl<'a> Iterator for ExpandedLabels<'a> {
    type Item = &'a PrintItem;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(item) = self.items.get(self.item_index) {
            if self.emitted_for_item < item.label_count() {
                self.emitted_for_item += 1;
                self.remaining -= 1;
                return Some(item);
            }
            self.item_index += 1;
            self.emitted_for_item = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ExpandedLabels<'_> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl FusedIterator for ExpandedLabels<'_> {}
