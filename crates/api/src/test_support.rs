//! Shared doubles for this crate's tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::notify::Notifier;
use crate::pipeline::Navigator;

#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
    successes: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).push(message.to_owned());
    }

    fn success(&self, message: &str) {
        self.successes.lock().unwrap_or_else(PoisonError::into_inner).push(message.to_owned());
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().unwrap_or_else(PoisonError::into_inner).push(path.to_owned());
    }
}
