use std::sync::Arc;

use anyhow::Result;
use stockdesk_api::client::truncate;
use stockdesk_api::{ListEndpoint, RemoteCall};
use stockdesk_core::{
    HeaderCheck, ROWS_PER_PAGE_OPTIONS, StockFilters, StockRow, TableState, empty_rows,
};
use stockdesk_retrieval::{ListRetriever, RetrievalError, RetrievalState, RetrieverOptions};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::ListArgs;
use super::stock::{DEFAULT_SORT, sort_stock, stock_payload};
use crate::app::App;

const HELP: &str = "\
commands:
  /text     search (debounced), `/` alone clears
  n | p     next | previous page
  s FIELD   sort by id, sku, item, grade, size, rack, quantity, available
  r N       rows per page (5, 10, 25)
  x ID      toggle selection of a row
  a         select or clear all visible rows
  v         keep only visible rows selected
  f         fetch again
  q         quit";

#[derive(Debug, PartialEq, Eq)]
enum Key {
    Search(String),
    Next,
    Prev,
    Sort(String),
    Rows(usize),
    Toggle(u64),
    ToggleAll,
    KeepVisible,
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

fn parse_key(line: &str) -> Key {
    let line = line.trim();
    if let Some(term) = line.strip_prefix('/') {
        return Key::Search(term.trim().to_owned());
    }
    let (cmd, arg) = line.split_once(' ').map_or((line, ""), |(c, a)| (c, a.trim()));
    let unknown = || Key::Unknown(line.to_owned());
    match cmd {
        "n" => Key::Next,
        "p" => Key::Prev,
        "s" if !arg.is_empty() => Key::Sort(arg.to_owned()),
        "r" => arg.parse().map_or_else(|_| unknown(), Key::Rows),
        "x" => arg.parse().map_or_else(|_| unknown(), Key::Toggle),
        "a" => Key::ToggleAll,
        "v" => Key::KeepVisible,
        "f" => Key::Refresh,
        "?" | "h" => Key::Help,
        "q" => Key::Quit,
        _ => unknown(),
    }
}

/// One-based page number for display.
const fn page_number(table: &TableState<u64>) -> usize {
    table.page().saturating_add(1)
}

const fn header_mark(check: HeaderCheck) -> &'static str {
    match check {
        HeaderCheck::Checked => "[x]",
        HeaderCheck::Indeterminate => "[-]",
        HeaderCheck::Unchecked => "[ ]",
    }
}

fn render(table: &TableState<u64>, search: &str, state: &RetrievalState<StockRow>) {
    if let Some(error) = &state.error {
        if matches!(error, RetrievalError::Rejected { .. }) {
            eprintln!("error: {}", error.message());
        }
        println!("(no rows)");
        return;
    }

    let mut rows = state.items.clone();
    sort_stock(&mut rows, table);
    let total = state.total();
    let pages = state.pagination.map_or(1, |p| p.page_count().max(1));

    println!();
    println!(
        "page {}/{pages} | {total} rows | sorted by {} {} | {} selected",
        page_number(table),
        table.order_by(),
        table.order(),
        table.selected_count(),
    );
    println!(
        "{}  {:>6}  {:<16}  {:<24}  {:>9}",
        header_mark(table.header_check(rows.len())),
        "id",
        "sku",
        "item",
        "available"
    );
    for row in &rows {
        let mark = if table.is_selected(&row.id) { "[x]" } else { "[ ]" };
        println!(
            "{mark}  {:>6}  {:<16}  {:<24}  {:>9}",
            row.id,
            truncate(&row.sku, 16),
            truncate(&row.item_name, 24),
            row.available()
        );
    }
    let filler = empty_rows(table.page(), table.rows_per_page(), total).min(table.rows_per_page());
    for _ in 0..filler {
        println!("~");
    }
    if state.is_not_found(search) {
        println!("No results found for \"{search}\".");
    }
}

/// Interactive pager over stock. Payload changes go through the retrieval
/// engine, so typed searches are debounced and page moves fetch at once.
pub(crate) async fn run(app: &App, list: &ListArgs, filters: StockFilters) -> Result<()> {
    let mut table = list.table(DEFAULT_SORT)?;
    let mut search = list.search().to_owned();
    let remote: Arc<dyn RemoteCall<StockRow>> = Arc::new(ListEndpoint::stock(app.client.clone()));
    let retriever = ListRetriever::spawn(
        remote,
        stock_payload(&table, &search, &filters)?,
        RetrieverOptions::from_env(),
    );
    let mut updates = retriever.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown: RetrievalState<StockRow> = RetrievalState::default();
    eprintln!("{HELP}");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state.is_loading {
                    continue;
                }
                render(&table, &search, &state);
                shown = state;
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_key(&line) {
                    Key::Quit => break,
                    Key::Help => {
                        eprintln!("{HELP}");
                        continue;
                    },
                    Key::Refresh => {
                        retriever.refetch();
                        continue;
                    },
                    Key::Next => {
                        if !shown.pagination.is_some_and(|p| p.has_next()) {
                            eprintln!("Already on the last page.");
                            continue;
                        }
                        table.change_page(table.page().saturating_add(1));
                    },
                    Key::Prev => {
                        let Some(previous) = table.page().checked_sub(1) else {
                            eprintln!("Already on the first page.");
                            continue;
                        };
                        table.change_page(previous);
                    },
                    Key::Search(term) => {
                        search = term;
                        table.reset_page();
                    },
                    Key::Rows(rows) => {
                        if !ROWS_PER_PAGE_OPTIONS.contains(&rows) {
                            eprintln!("Rows per page must be one of {ROWS_PER_PAGE_OPTIONS:?}.");
                            continue;
                        }
                        table.change_rows_per_page(rows);
                    },
                    Key::Sort(field) => {
                        table.sort(&field);
                        render(&table, &search, &shown);
                        continue;
                    },
                    Key::Toggle(id) => {
                        table.select_row(id);
                        render(&table, &search, &shown);
                        continue;
                    },
                    Key::ToggleAll => {
                        let checked = table.header_check(shown.items.len()) != HeaderCheck::Checked;
                        table.select_all(checked, shown.items.iter().map(|r| r.id));
                        render(&table, &search, &shown);
                        continue;
                    },
                    Key::KeepVisible => {
                        table.retain_visible(shown.items.iter().map(|r| &r.id));
                        render(&table, &search, &shown);
                        continue;
                    },
                    Key::Unknown(input) => {
                        eprintln!("Unknown command `{input}`, type ? for help.");
                        continue;
                    },
                }
                retriever.set_payload(stock_payload(&table, &search, &filters)?);
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_keeps_inner_spaces() {
        assert_eq!(parse_key("/ steel bar "), Key::Search("steel bar".to_owned()));
        assert_eq!(parse_key("/"), Key::Search(String::new()));
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(parse_key("s quantity"), Key::Sort("quantity".to_owned()));
        assert_eq!(parse_key("r 25"), Key::Rows(25));
        assert_eq!(parse_key("x 42"), Key::Toggle(42));
        assert_eq!(parse_key(" n "), Key::Next);
        assert_eq!(parse_key("q"), Key::Quit);
    }

    #[test]
    fn test_parse_rejects_malformed_arguments() {
        assert_eq!(parse_key("r many"), Key::Unknown("r many".to_owned()));
        assert_eq!(parse_key("s"), Key::Unknown("s".to_owned()));
        assert_eq!(parse_key("zz"), Key::Unknown("zz".to_owned()));
    }

    #[test]
    fn test_page_number_saturates_at_last_index() {
        let mut table = TableState::<u64>::new("sku");
        assert_eq!(page_number(&table), 1);
        table.change_page(usize::MAX);
        assert_eq!(page_number(&table), usize::MAX);
    }

    #[test]
    fn test_header_mark_tracks_selection() {
        let mut table = TableState::<u64>::new("sku");
        assert_eq!(header_mark(table.header_check(3)), "[ ]");
        table.select_row(1);
        assert_eq!(header_mark(table.header_check(3)), "[-]");
        table.select_all(true, [1, 2, 3]);
        assert_eq!(header_mark(table.header_check(3)), "[x]");
    }
}
