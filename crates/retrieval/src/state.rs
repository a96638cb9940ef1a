use stockdesk_core::PaginationMetadata;

use crate::RetrievalError;

/// Snapshot of a list view's data.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalState<T> {
    pub items: Vec<T>,
    pub pagination: Option<PaginationMetadata>,
    /// True while the fetch for the current payload is outstanding.
    pub is_loading: bool,
    pub error: Option<RetrievalError>,
}

impl<T> Default for RetrievalState<T> {
    fn default() -> Self {
        Self { items: Vec::new(), pagination: None, is_loading: false, error: None }
    }
}

impl<T> RetrievalState<T> {
    /// Nothing to show because a search matched no rows.
    #[must_use]
    pub fn is_not_found(&self, search: &str) -> bool {
        self.items.is_empty() && !search.is_empty() && !self.is_loading && self.error.is_none()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.pagination.map_or(self.items.len(), |p| p.total)
    }
}
