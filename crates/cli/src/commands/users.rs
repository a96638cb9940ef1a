use std::sync::Arc;

use anyhow::Result;
use stockdesk_api::{ListEndpoint, RemoteCall};
use stockdesk_core::{TableState, UserRecord, compare_by};

use super::{ListArgs, fetch_page};
use crate::app::App;
use crate::output::print_page;

fn sort_users(rows: &mut [UserRecord], table: &TableState<u64>) {
    let order = table.order();
    match table.order_by() {
        "username" => rows.sort_by(|a, b| compare_by(order, a, b, |u| u.username.clone())),
        "email" => rows.sort_by(|a, b| compare_by(order, a, b, |u| u.email.clone())),
        "role" => rows.sort_by(|a, b| compare_by(order, a, b, |u| u.role.clone())),
        "id" => rows.sort_by(|a, b| compare_by(order, a, b, |u| u.id)),
        _ => rows.sort_by(|a, b| compare_by(order, a, b, |u| u.name.to_lowercase())),
    }
}

pub(crate) async fn run_list(app: &App, list: ListArgs) -> Result<()> {
    let table = list.table("name")?;
    let payload = table.payload().with_search(list.search());
    let remote: Arc<dyn RemoteCall<UserRecord>> = Arc::new(ListEndpoint::users(app.client.clone()));
    let state = fetch_page(remote, payload).await?;

    let mut rows = state.items.clone();
    sort_users(&mut rows, &table);
    print_page(&table, list.search(), &state, &rows)
}
