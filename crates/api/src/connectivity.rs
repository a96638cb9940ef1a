//! Network connectivity probe consulted before every call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::notify::Notifier;

pub const OFFLINE_MESSAGE: &str = "You are offline. Please check your internet connection.";
pub const BACK_ONLINE_MESSAGE: &str = "You are back online!";

pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Probe for environments without connectivity events.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Connectivity flag fed by platform events. Announces every transition
/// once through the notifier.
pub struct OnlineStatus {
    online: AtomicBool,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for OnlineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnlineStatus").field("online", &self.online).finish_non_exhaustive()
    }
}

impl OnlineStatus {
    #[must_use]
    pub fn new(online: bool, notifier: Arc<dyn Notifier>) -> Self {
        Self { online: AtomicBool::new(online), notifier }
    }

    /// Records the new state; notifies only when it differs from the old one.
    pub fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::SeqCst);
        if was == online {
            return;
        }
        if online {
            tracing::info!("connectivity restored");
            self.notifier.success(BACK_ONLINE_MESSAGE);
        } else {
            tracing::warn!("connectivity lost");
            self.notifier.error(OFFLINE_MESSAGE);
        }
    }
}

impl Connectivity for OnlineStatus {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
