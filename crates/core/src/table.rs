//! Client-side table interaction state: sort column and direction, page
//! window and row selection. Pure state transitions, no I/O.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_ROWS_PER_PAGE, RetrievalPayload};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Applies this direction to an ascending comparison result.
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// State of the header "select all" checkbox for the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderCheck {
    Unchecked,
    Indeterminate,
    Checked,
}

/// Sort, page and selection state owned by a list view.
///
/// `selected` is never intersected with the fetched rows implicitly, so a
/// selection survives page changes. Call [`TableState::retain_visible`] to
/// drop identifiers that are no longer shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState<Id: Ord> {
    page: usize,
    rows_per_page: usize,
    order_by: String,
    order: Order,
    selected: BTreeSet<Id>,
}

impl<Id: Ord + Clone> TableState<Id> {
    #[must_use]
    pub fn new(order_by: impl Into<String>) -> Self {
        Self {
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            order_by: order_by.into(),
            order: Order::Asc,
            selected: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    #[must_use]
    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    #[must_use]
    pub const fn order(&self) -> Order {
        self.order
    }

    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<Id> {
        &self.selected
    }

    /// Same column while ascending flips to descending; anything else sorts
    /// ascending on `field`.
    pub fn sort(&mut self, field: &str) {
        if self.order_by == field && self.order == Order::Asc {
            self.order = Order::Desc;
        } else {
            self.order = Order::Asc;
            field.clone_into(&mut self.order_by);
        }
    }

    /// Replaces the selection with `visible` when checked, clears it otherwise.
    pub fn select_all<I: IntoIterator<Item = Id>>(&mut self, checked: bool, visible: I) {
        self.selected = if checked { visible.into_iter().collect() } else { BTreeSet::new() };
    }

    /// Toggles membership of `id`.
    pub fn select_row(&mut self, id: Id) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn reset_page(&mut self) {
        self.page = 0;
    }

    /// No bounds check; the caller disables out-of-range navigation.
    pub fn change_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn change_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page;
        self.reset_page();
    }

    #[must_use]
    pub fn is_selected(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Drops selected identifiers that are not in `visible`.
    pub fn retain_visible<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a Id>,
        Id: 'a,
    {
        let visible: BTreeSet<&Id> = visible.into_iter().collect();
        self.selected.retain(|id| visible.contains(id));
    }

    #[must_use]
    pub fn header_check(&self, row_count: usize) -> HeaderCheck {
        let selected = self.selected.len();
        if row_count > 0 && selected == row_count {
            HeaderCheck::Checked
        } else if selected > 0 && selected < row_count {
            HeaderCheck::Indeterminate
        } else {
            HeaderCheck::Unchecked
        }
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.rows_per_page
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_mul(self.rows_per_page)
    }

    /// Payload for the current page window, with no search and no filters.
    #[must_use]
    pub fn payload(&self) -> RetrievalPayload {
        RetrievalPayload::new(self.limit(), self.offset())
    }
}

impl<Id: Ord + Clone> Default for TableState<Id> {
    fn default() -> Self {
        Self::new("name")
    }
}

/// Number of filler rows needed to keep the last page at full height.
#[must_use]
pub const fn empty_rows(page: usize, rows_per_page: usize, total: usize) -> usize {
    if page == 0 {
        return 0;
    }
    let shown = page.saturating_add(1).saturating_mul(rows_per_page);
    shown.saturating_sub(total)
}

/// Compares two rows through `key`, honouring `order`.
pub fn compare_by<T, K: Ord>(order: Order, a: &T, b: &T, key: impl Fn(&T) -> K) -> Ordering {
    order.apply(key(a).cmp(&key(b)))
}
