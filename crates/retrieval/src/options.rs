use std::time::Duration;

use stockdesk_core::{DEFAULT_DEBOUNCE_MS, env_parse_with_default};

pub const DEBOUNCE_ENV: &str = "STOCKDESK_DEBOUNCE_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrieverOptions {
    /// Quiet period after the last `search` change before it is applied.
    pub debounce: Duration,
    /// When false no fetch is issued and state is left as it is.
    pub enabled: bool,
}

impl Default for RetrieverOptions {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS), enabled: true }
    }
}

impl RetrieverOptions {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            debounce: Duration::from_millis(env_parse_with_default(
                DEBOUNCE_ENV,
                DEFAULT_DEBOUNCE_MS,
            )),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
