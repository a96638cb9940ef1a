//! Client configuration read from the environment.

use std::time::Duration;

use stockdesk_core::{
    DEFAULT_API_URL, DEFAULT_LOGOUT_REDIRECT_MS, DEFAULT_TIMEOUT_SECS, env_parse_with_default,
    env_string_or,
};

pub const API_URL_ENV: &str = "STOCKDESK_API_URL";
pub const TIMEOUT_ENV: &str = "STOCKDESK_TIMEOUT_SECS";
pub const LOGOUT_REDIRECT_ENV: &str = "STOCKDESK_LOGOUT_REDIRECT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub logout_redirect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            logout_redirect_delay: Duration::from_millis(DEFAULT_LOGOUT_REDIRECT_MS),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env_string_or(API_URL_ENV, DEFAULT_API_URL),
            timeout: Duration::from_secs(env_parse_with_default(TIMEOUT_ENV, DEFAULT_TIMEOUT_SECS)),
            logout_redirect_delay: Duration::from_millis(env_parse_with_default(
                LOGOUT_REDIRECT_ENV,
                DEFAULT_LOGOUT_REDIRECT_MS,
            )),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
