//! User-facing notification seam (toasts in a browser, stderr in the CLI).

/// Receives the single user-facing message for an event.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
    fn success(&self, message: &str);
}
