//! Shared constants for stockdesk.
//!
//! Centralizes defaults that are otherwise duplicated between the engine,
//! the API client and the CLI.

/// Default quiet period before a changed search term is applied.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default delay between a forced logout and the redirect to sign-in.
pub const DEFAULT_LOGOUT_REDIRECT_MS: u64 = 1000;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Default page size for list views.
pub const DEFAULT_ROWS_PER_PAGE: usize = 5;

/// Page sizes offered by list views.
pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 25];

/// Route of the sign-in entry point.
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Key under which the signed-in user record is persisted.
pub const SESSION_USER_KEY: &str = "user";

/// Envelope `code` reported by a successful call.
pub const SUCCESS_CODE: u16 = 200;

/// Envelope `status` reported by a successful call.
pub const SUCCESS_STATUS: &str = "success";

/// Fallback message when a list fetch fails without a server message.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data";
