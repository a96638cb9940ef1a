//! Transport-agnostic "invoke a list operation" seam used by the
//! retrieval engine.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use stockdesk_core::{Envelope, PickupCartRow, RetrievalPayload, StockRow, UserRecord};

use crate::client::ApiClient;
use crate::endpoints::{PICKUP_CART_PATH, STOCK_PATH, USERS_PATH};
use crate::error::ClassifiedError;

/// A remote list operation: payload in, envelope or classified failure out.
///
/// Failures have already been through the error pipeline when they reach
/// the caller.
#[async_trait]
pub trait RemoteCall<T>: Send + Sync {
    async fn call(&self, payload: &RetrievalPayload) -> Result<Envelope<Vec<T>>, ClassifiedError>;
}

/// `POST {resource}/retrieve` on an [`ApiClient`].
pub struct ListEndpoint<T> {
    client: Arc<ApiClient>,
    resource: &'static str,
    _rows: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for ListEndpoint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListEndpoint").field("resource", &self.resource).finish_non_exhaustive()
    }
}

impl<T> ListEndpoint<T> {
    #[must_use]
    pub fn new(client: Arc<ApiClient>, resource: &'static str) -> Self {
        Self { client, resource, _rows: PhantomData }
    }

    #[must_use]
    pub fn resource(&self) -> &'static str {
        self.resource
    }
}

impl ListEndpoint<StockRow> {
    #[must_use]
    pub fn stock(client: Arc<ApiClient>) -> Self {
        Self::new(client, STOCK_PATH)
    }
}

impl ListEndpoint<UserRecord> {
    #[must_use]
    pub fn users(client: Arc<ApiClient>) -> Self {
        Self::new(client, USERS_PATH)
    }
}

impl ListEndpoint<PickupCartRow> {
    #[must_use]
    pub fn pickup_cart(client: Arc<ApiClient>) -> Self {
        Self::new(client, PICKUP_CART_PATH)
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> RemoteCall<T> for ListEndpoint<T> {
    async fn call(&self, payload: &RetrievalPayload) -> Result<Envelope<Vec<T>>, ClassifiedError> {
        self.client.retrieve(self.resource, payload).await
    }
}
