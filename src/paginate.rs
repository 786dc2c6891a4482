//! Sheet pagination over the expanded label sequence.

use core::fmt;
use core::iter::{Enumerate, FusedIterator};

use crate::config::{LABELS_PER_PAGE, LABEL_COLUMNS};
use crate::expand::{expand, ExpandedLabels};
use crate::item::PrintItem;

/// Position of one label on the printed sheets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LabelSlot {
    /// Sheet index (0-based).
    pub page_index: usize,
    /// Grid position within the sheet, `0..LABELS_PER_PAGE`, row-major.
    pub index_within_page: usize,
}

impl LabelSlot {
    /// Slot for the `position`-th label (0-based) of the whole run.
    pub const fn from_position(position: usize) -> Self {
        Self {
            page_index: position / LABELS_PER_PAGE,
            index_within_page: position % LABELS_PER_PAGE,
        }
    }

    /// Grid row (0-based, top to bottom).
    pub const fn row(&self) -> usize {
        self.index_within_page / LABEL_COLUMNS
    }

    /// Grid column (0-based, left to right).
    pub const fn column(&self) -> usize {
        self.index_within_page % LABEL_COLUMNS
    }

    /// True when this slot opens a sheet after the first one.
    pub const fn starts_new_page(&self) -> bool {
        self.index_within_page == 0 && self.page_index > 0
    }
}

/// Assign a [`LabelSlot`] to every expanded label.
///
/// Labels fill sheets in order without balancing, so an item's repeats may
/// straddle a sheet boundary.
pub fn paginate(items: &[PrintItem]) -> Paginated<'_> {
    Paginated {
        labels: expand(items).enumerate(),
    }
}

/// Iterator returned by [`paginate`].
#[derive(Clone, Debug)]
pub struct Paginated<'a> {
    labels: Enumerate<ExpandedLabels<'a>>,
}

impl<'a> Iterator for Paginated<'a> {
    type Item = (LabelSlot, &'a PrintItem);

    fn next(&mut self) -> Option<Self::Item> {
        self.labels
            .next()
            .map(|(position, item)| (LabelSlot::from_position(position), item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.labels.size_hint()
    }
}

impl ExactSizeIterator for Paginated<'_> {}

impl FusedIterator for Paginated<'_> {}

/// Label/sheet accounting for a print run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SheetSummary {
    pub labels: usize,
    pub sheets: usize,
    /// Unused slots on the last sheet.
    pub wasted_labels: usize,
}

impl SheetSummary {
    pub const fn for_label_count(labels: usize) -> Self {
        let remainder = labels % LABELS_PER_PAGE;
        Self {
            labels,
            sheets: labels.div_ceil(LABELS_PER_PAGE),
            wasted_labels: if remainder == 0 {
                0
            } else {
                LABELS_PER_PAGE - remainder
            },
        }
    }

    pub fn for_items(items: &[PrintItem]) -> Self {
        Self::for_label_count(expand(items).len())
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl fmt::Display for SheetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} label{} -> {} sheet{} & {} wasted label{}",
            self.labels,
            plural(self.labels),
            self.sheets,
            plural(self.sheets),
            self.wasted_labels,
            plural(self.wasted_labels)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LABEL_ROWS;

    fn items_with_counts(counts: &[u32]) -> Vec<PrintItem> {
        counts
            .iter()
            .enumerate()
            .map(|(idx, count)| PrintItem::new(format!("t{idx}"), "", "", "").with_count(*count))
            .collect()
    }

    #[test]
    fn slot_math_matches_integer_division() {
        assert_eq!(
            LabelSlot::from_position(0),
            LabelSlot {
                page_index: 0,
                index_within_page: 0
            }
        );
        assert_eq!(
            LabelSlot::from_position(29),
            LabelSlot {
                page_index: 0,
                index_within_page: 29
            }
        );
        assert_eq!(
            LabelSlot::from_position(30),
            LabelSlot {
                page_index: 1,
                index_within_page: 0
            }
        );
        assert_eq!(LabelSlot::from_position(31).index_within_page, 1);
    }

    #[test]
    fn row_and_column_recover_index_within_page() {
        for index in 0..LABELS_PER_PAGE {
            let slot = LabelSlot::from_position(index);
            assert!(slot.row() < LABEL_ROWS);
            assert!(slot.column() < LABEL_COLUMNS);
            assert_eq!(slot.row() * LABEL_COLUMNS + slot.column(), index);
        }
    }

    #[test]
    fn new_page_starts_only_on_wrap_after_first_label() {
        let starts: Vec<usize> = (0..95)
            .filter(|pos| LabelSlot::from_position(*pos).starts_new_page())
            .collect();
        assert_eq!(starts, [30, 60, 90]);
    }

    #[test]
    fn page_count_is_ceiling_and_only_last_page_is_partial() {
        for total in [0u32, 1, 29, 30, 31, 59, 60, 61, 95] {
            let items = items_with_counts(&[total]);
            let mut per_page: Vec<usize> = Vec::new();
            for (slot, _) in paginate(&items) {
                if slot.page_index == per_page.len() {
                    per_page.push(0);
                }
                per_page[slot.page_index] += 1;
            }
            let expected_pages = (total as usize).div_ceil(LABELS_PER_PAGE);
            assert_eq!(per_page.len(), expected_pages, "total={total}");
            if let Some((_, full)) = per_page.split_last() {
                assert!(full.iter().all(|n| *n == LABELS_PER_PAGE));
            }
        }
    }

    #[test]
    fn item_repeats_straddle_page_boundary_unchanged() {
        let items = items_with_counts(&[28, 4]);
        let tail: Vec<(usize, usize, &str)> = paginate(&items)
            .skip(27)
            .map(|(slot, item)| (slot.page_index, slot.index_within_page, item.token.as_str()))
            .collect();
        assert_eq!(
            tail,
            [
                (0, 27, "t0"),
                (0, 28, "t1"),
                (0, 29, "t1"),
                (1, 0, "t1"),
                (1, 1, "t1"),
            ]
        );
    }

    #[test]
    fn thirty_one_labels_fill_two_sheets() {
        let items = items_with_counts(&[31]);
        let summary = SheetSummary::for_items(&items);
        assert_eq!(
            summary,
            SheetSummary {
                labels: 31,
                sheets: 2,
                wasted_labels: 29
            }
        );
        let last = paginate(&items).last().map(|(slot, _)| slot);
        assert_eq!(
            last,
            Some(LabelSlot {
                page_index: 1,
                index_within_page: 0
            })
        );
    }

    #[test]
    fn summary_display_uses_singular_forms() {
        assert_eq!(
            SheetSummary::for_label_count(1).to_string(),
            "1 label -> 1 sheet & 29 wasted labels"
        );
        assert_eq!(
            SheetSummary::for_label_count(29).to_string(),
            "29 labels -> 1 sheet & 1 wasted label"
        );
        assert_eq!(
            SheetSummary::for_label_count(60).to_string(),
            "60 labels -> 2 sheets & 0 wasted labels"
        );
    }
}
