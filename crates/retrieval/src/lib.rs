//! List retrieval engine.
//!
//! A [`ListRetriever`] owns the items, pagination, loading flag and error of
//! one list view. The caller pushes payload changes; the engine debounces the
//! `search` field, refetches immediately on any other change and publishes
//! state snapshots on a watch channel.

mod error;
mod options;
mod retriever;
#[cfg(test)]
mod retriever_tests;
mod state;

pub use error::RetrievalError;
pub use options::{DEBOUNCE_ENV, RetrieverOptions};
pub use retriever::ListRetriever;
pub use state::RetrievalState;
