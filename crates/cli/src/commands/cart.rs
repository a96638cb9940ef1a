use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use stockdesk_api::{ListEndpoint, RemoteCall};
use stockdesk_core::{PickupCartInput, PickupCartRow, TableState, compare_by};

use super::{ListArgs, fetch_page, or_default};
use crate::app::App;
use crate::output::print_page;

#[derive(Subcommand)]
pub(crate) enum CartCommands {
    /// List pickup cart lines
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Put stock into the pickup cart
    Add {
        product_stock_id: u64,
        #[arg(long)]
        sku: String,
        #[arg(short, long)]
        quantity: i64,
    },
    /// Remove a pickup cart line
    Remove { id: u64 },
}

fn sort_cart(rows: &mut [PickupCartRow], table: &TableState<u64>) {
    let order = table.order();
    match table.order_by() {
        "quantity" => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.quantity)),
        "user" => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.user_name.clone())),
        "id" => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.id)),
        _ => rows.sort_by(|a, b| compare_by(order, a, b, |r| r.sku.clone())),
    }
}

pub(crate) async fn run(app: &App, cmd: CartCommands) -> Result<()> {
    match cmd {
        CartCommands::List { list } => {
            let table = list.table("sku")?;
            let payload = table.payload().with_search(list.search());
            let remote: Arc<dyn RemoteCall<PickupCartRow>> =
                Arc::new(ListEndpoint::pickup_cart(app.client.clone()));
            let state = fetch_page(remote, payload).await?;

            let mut rows = state.items.clone();
            sort_cart(&mut rows, &table);
            print_page(&table, list.search(), &state, &rows)
        },
        CartCommands::Add { product_stock_id, sku, quantity } => {
            let input = PickupCartInput { product_stock_id, sku, quantity };
            input.validate()?;
            let added = app.client.add_to_pickup_cart(&input).await?;
            app.notify_success(or_default(&added.message, "Added to pickup cart."));
            println!("{}", serde_json::to_string_pretty(&added.data)?);
            Ok(())
        },
        CartCommands::Remove { id } => {
            let removed = app.client.remove_from_pickup_cart(id).await?;
            app.notify_success(or_default(&removed.message, "Removed from pickup cart."));
            Ok(())
        },
    }
}
