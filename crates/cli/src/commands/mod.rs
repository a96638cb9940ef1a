pub(crate) mod auth;
pub(crate) mod browse;
pub(crate) mod cart;
pub(crate) mod stock;
pub(crate) mod users;

use std::sync::Arc;

use anyhow::{Result, ensure};
use clap::Args;
use stockdesk_api::RemoteCall;
use stockdesk_core::{DEFAULT_ROWS_PER_PAGE, ROWS_PER_PAGE_OPTIONS, RetrievalPayload, TableState};
use stockdesk_retrieval::{ListRetriever, RetrievalState, RetrieverOptions};

/// Paging, sorting and search shared by every list command.
#[derive(Args, Debug, Clone)]
pub(crate) struct ListArgs {
    /// Free-text search
    #[arg(short, long)]
    pub(crate) search: Option<String>,
    /// Zero-based page index
    #[arg(long, default_value = "0")]
    pub(crate) page: usize,
    /// Rows per page (5, 10 or 25)
    #[arg(short, long, default_value_t = DEFAULT_ROWS_PER_PAGE)]
    pub(crate) rows: usize,
    /// Column to sort the page by
    #[arg(long)]
    pub(crate) sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    pub(crate) desc: bool,
}

impl ListArgs {
    pub(crate) fn search(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }

    pub(crate) fn table(&self, default_sort: &str) -> Result<TableState<u64>> {
        ensure!(
            ROWS_PER_PAGE_OPTIONS.contains(&self.rows),
            "--rows must be one of {ROWS_PER_PAGE_OPTIONS:?}, got {}",
            self.rows
        );
        let mut table = TableState::new(self.sort.as_deref().unwrap_or(default_sort));
        if self.desc {
            let field = table.order_by().to_owned();
            table.sort(&field);
        }
        table.change_rows_per_page(self.rows);
        table.change_page(self.page);
        Ok(table)
    }
}

/// Server message when it sent one, `fallback` otherwise.
pub(crate) fn or_default<'a>(message: &'a str, fallback: &'a str) -> &'a str {
    if message.trim().is_empty() { fallback } else { message }
}

/// Runs one retrieval to completion and returns the settled state.
pub(crate) async fn fetch_page<T>(
    remote: Arc<dyn RemoteCall<T>>,
    payload: RetrievalPayload,
) -> Result<RetrievalState<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let retriever = ListRetriever::spawn(remote, payload, RetrieverOptions::from_env());
    let mut state = retriever.wait_until_settled().await;
    if let Some(error) = state.error.take() {
        return Err(error.into());
    }
    Ok(state)
}
