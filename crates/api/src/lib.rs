//! REST client for the stockdesk console.
//!
//! Every call goes through the [`ErrorPipeline`]: failures are classified,
//! announced once through the [`Notifier`] and returned to the caller, and a
//! 401 tears the persisted session down.

pub mod client;
pub mod config;
pub mod connectivity;
pub mod endpoints;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod remote;
pub mod session;
#[cfg(test)]
mod test_support;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use connectivity::{AlwaysOnline, Connectivity, OnlineStatus};
pub use error::{
    ApiErrorKind, ClassifiedError, ClientInitError, ErrorBody, FailureStatus, RawApiError,
    SessionError,
};
pub use notify::Notifier;
pub use pipeline::{ErrorPipeline, HardRedirect, Navigator, classify_with};
pub use remote::{ListEndpoint, RemoteCall};
pub use session::{
    AuthState, AuthStore, FileSessionStore, MemorySessionStore, SessionClearer, SessionStore,
};
