use anyhow::Result;
use serde::Serialize;
use stockdesk_core::{Order, TableState, empty_rows};
use stockdesk_retrieval::RetrievalState;

/// JSON shape printed by the list commands.
#[derive(Serialize)]
pub(crate) struct PageView<'a, T> {
    page: usize,
    rows_per_page: usize,
    order_by: &'a str,
    order: Order,
    total: usize,
    page_count: usize,
    empty_rows: usize,
    items: &'a [T],
}

impl<'a, T> PageView<'a, T> {
    pub(crate) fn new(table: &'a TableState<u64>, state: &RetrievalState<T>, items: &'a [T]) -> Self {
        let total = state.total();
        Self {
            page: table.page(),
            rows_per_page: table.rows_per_page(),
            order_by: table.order_by(),
            order: table.order(),
            total,
            page_count: state.pagination.map_or(1, |p| p.page_count()),
            empty_rows: empty_rows(table.page(), table.rows_per_page(), total),
            items,
        }
    }
}

/// Prints the page as pretty JSON on stdout, with a hint on stderr when a
/// search matched nothing.
pub(crate) fn print_page<T: Serialize>(
    table: &TableState<u64>,
    search: &str,
    state: &RetrievalState<T>,
    items: &[T],
) -> Result<()> {
    if state.is_not_found(search) {
        eprintln!("No results found for \"{search}\".");
    }
    println!("{}", serde_json::to_string_pretty(&PageView::new(table, state, items))?);
    Ok(())
}
