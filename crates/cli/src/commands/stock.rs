use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use stockdesk_api::{ListEndpoint, RemoteCall};
use stockdesk_core::{RetrievalPayload, StockFilters, StockInput, StockRow, TableState, compare_by};

use super::{ListArgs, fetch_page, or_default};
use crate::app::App;
use crate::output::print_page;

pub(crate) const DEFAULT_SORT: &str = "sku";

#[derive(Subcommand)]
pub(crate) enum StockCommands {
    /// Fetch one page of stock
    List {
        #[command(flatten)]
        list: ListArgs,
        #[command(flatten)]
        filters: StockFilterArgs,
    },
    /// Page through stock interactively
    Browse {
        #[command(flatten)]
        list: ListArgs,
        #[command(flatten)]
        filters: StockFilterArgs,
    },
    /// Create a stock record
    Create {
        /// Record as JSON, or @path to a JSON file
        #[arg(long)]
        json: String,
    },
    /// Replace a stock record
    Update {
        id: u64,
        /// Record as JSON, or @path to a JSON file
        #[arg(long)]
        json: String,
    },
    /// Delete a stock record
    Delete { id: u64 },
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct StockFilterArgs {
    /// Invoice date from (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Invoice date to (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    godown: String,
    #[arg(long, default_value = "")]
    grade: String,
    #[arg(long, default_value = "")]
    brand: String,
    #[arg(long = "spec", default_value = "")]
    specification: String,
    #[arg(long, default_value = "")]
    item: String,
    #[arg(long, default_value = "")]
    size: String,
    #[arg(long, default_value = "")]
    finish: String,
}

impl From<StockFilterArgs> for StockFilters {
    fn from(args: StockFilterArgs) -> Self {
        Self {
            date_from: args.from,
            date_to: args.to,
            godown: args.godown,
            grade: args.grade,
            brand: args.brand,
            specification: args.specification,
            item: args.item,
            size: args.size,
            finish: args.finish,
        }
    }
}

/// Sorts the fetched page client-side by the table's column.
pub(crate) fn sort_stock(rows: &mut [StockRow], table: &TableState<u64>) {
    let order = table.order();
    match table.order_by() {
        "id" => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.id)),
        "item" => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.item_name.to_lowercase())),
        "grade" => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.grade_no.clone())),
        "size" => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.product_size.clone())),
        "rack" => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.rack_no.clone())),
        "quantity" => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.quantity)),
        "available" => rows.sort_by(|a, b| compare_by(order, a, b, StockRow::available)),
        _ => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.sku.clone())),
    }
}

pub(crate) fn stock_payload(
    table: &TableState<u64>,
    search: &str,
    filters: &StockFilters,
) -> Result<RetrievalPayload> {
    Ok(table.payload().with_search(search).with_filters(filters)?)
}

fn read_input(json: &str) -> Result<StockInput> {
    let raw = match json.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?,
        None => json.to_owned(),
    };
    serde_json::from_str(&raw).context("stock record is not valid JSON")
}

pub(crate) async fn run(app: &App, cmd: StockCommands) -> Result<()> {
    match cmd {
        StockCommands::List { list, filters } => {
            let table = list.table(DEFAULT_SORT)?;
            let payload = stock_payload(&table, list.search(), &filters.into())?;
            let remote: Arc<dyn RemoteCall<StockRow>> =
                Arc::new(ListEndpoint::stock(app.client.clone()));
            let state = fetch_page(remote, payload).await?;

            let mut rows = state.items.clone();
            sort_stock(&mut rows, &table);
            print_page(&table, list.search(), &state, &rows)
        },
        StockCommands::Browse { list, filters } => {
            super::browse::run(app, &list, filters.into()).await
        },
        StockCommands::Create { json } => {
            let input = read_input(&json)?;
            let created = app.client.create_stock(&input).await?;
            app.notify_success(or_default(&created.message, "Stock created."));
            println!("{}", serde_json::to_string_pretty(&created.data)?);
            Ok(())
        },
        StockCommands::Update { id, json } => {
            let input = read_input(&json)?;
            let updated = app.client.update_stock(id, &input).await?;
            app.notify_success(or_default(&updated.message, "Stock updated."));
            println!("{}", serde_json::to_string_pretty(&updated.data)?);
            Ok(())
        },
        StockCommands::Delete { id } => {
            let deleted = app.client.delete_stock(id).await?;
            app.notify_success(or_default(&deleted.message, "Stock deleted."));
            Ok(())
        },
    }
}
