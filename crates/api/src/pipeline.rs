//! Error interception pipeline.
//!
//! Every failed call is classified here, announced to the user exactly once
//! and then handed back to the caller. A 401 additionally tears the session
//! down and, after a short delay, sends the user to the sign-in route.
//!
//! The navigation and session-clearing capabilities only exist once the
//! application has finished bootstrapping, so both are late-bound slots.
//! Until a navigator is wired, redirects go through the fallback "hard
//! redirect" navigator; until a clearer is wired, teardown removes the
//! persisted user record directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use stockdesk_core::{DEFAULT_LOGOUT_REDIRECT_MS, SIGN_IN_PATH};

use crate::connectivity::{Connectivity, OFFLINE_MESSAGE};
use crate::error::{ApiErrorKind, ClassifiedError, FailureStatus, RawApiError};
use crate::notify::Notifier;
use crate::session::{SessionClearer, SessionStore};

const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";
const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";
const MALFORMED_MESSAGE: &str = "Invalid response from server. Please try again.";
const BAD_REQUEST_MESSAGE: &str = "Bad request. Please check your input.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please login again.";
const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";
const NOT_FOUND_MESSAGE: &str = "Resource not found.";
const CONFLICT_MESSAGE: &str = "Conflict. This resource already exists.";
const VALIDATION_MESSAGE: &str = "Validation error. Please check your input.";
const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please slow down and try again later.";
const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable. Please try again later.";
const GATEWAY_TIMEOUT_MESSAGE: &str = "Gateway timeout. Please try again.";
const GENERIC_MESSAGE: &str = "An error occurred";

/// Moves the user to another route.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator used before the real one is wired: logs a full redirect.
#[derive(Debug, Default, Clone, Copy)]
pub struct HardRedirect;

impl Navigator for HardRedirect {
    fn navigate(&self, path: &str) {
        tracing::warn!(path, "no navigator wired, performing hard redirect");
    }
}

type Slot<T> = Arc<RwLock<Option<Arc<T>>>>;

fn read_slot<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>) -> Option<Arc<T>> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Classifies a failure given the connectivity at call time. First match wins.
#[must_use]
pub fn classify_with(raw: &RawApiError, online: bool) -> ApiErrorKind {
    if !online {
        return ApiErrorKind::Offline;
    }
    if raw.is_fetch_failure() {
        return ApiErrorKind::NetworkFailure;
    }
    match raw.status {
        Some(FailureStatus::TimeoutError) => return ApiErrorKind::Timeout,
        Some(FailureStatus::ParsingError) => return ApiErrorKind::MalformedResponse,
        _ => {},
    }
    let server = raw.server_message().map(str::to_owned);
    match raw.http_status() {
        Some(400) => ApiErrorKind::ClientError {
            status: 400,
            message: server.unwrap_or_else(|| BAD_REQUEST_MESSAGE.to_owned()),
        },
        Some(401) => ApiErrorKind::Unauthorized,
        Some(403) => ApiErrorKind::Forbidden,
        Some(404) => ApiErrorKind::NotFound,
        Some(409) => ApiErrorKind::Conflict,
        Some(422) => ApiErrorKind::ValidationFailure,
        Some(429) => ApiErrorKind::RateLimited,
        Some(500) => ApiErrorKind::ServerError,
        Some(502 | 503) => ApiErrorKind::ServiceUnavailable,
        Some(504) => ApiErrorKind::GatewayTimeout,
        _ => ApiErrorKind::Unknown { message: server.unwrap_or_else(|| GENERIC_MESSAGE.to_owned()) },
    }
}

/// The one message shown for a classified failure.
#[must_use]
pub fn display_message(kind: &ApiErrorKind, raw: &RawApiError) -> String {
    let server_or = |fallback: &str| raw.server_message().unwrap_or(fallback).to_owned();
    match kind {
        ApiErrorKind::Offline => OFFLINE_MESSAGE.to_owned(),
        ApiErrorKind::NetworkFailure => NETWORK_MESSAGE.to_owned(),
        ApiErrorKind::Timeout => TIMEOUT_MESSAGE.to_owned(),
        ApiErrorKind::MalformedResponse => MALFORMED_MESSAGE.to_owned(),
        ApiErrorKind::ClientError { message, .. } | ApiErrorKind::Unknown { message } => {
            message.clone()
        },
        ApiErrorKind::Unauthorized => SESSION_EXPIRED_MESSAGE.to_owned(),
        ApiErrorKind::Forbidden => FORBIDDEN_MESSAGE.to_owned(),
        ApiErrorKind::NotFound => server_or(NOT_FOUND_MESSAGE),
        ApiErrorKind::Conflict => server_or(CONFLICT_MESSAGE),
        ApiErrorKind::ValidationFailure => server_or(VALIDATION_MESSAGE),
        ApiErrorKind::RateLimited => RATE_LIMITED_MESSAGE.to_owned(),
        ApiErrorKind::ServerError => SERVER_ERROR_MESSAGE.to_owned(),
        ApiErrorKind::ServiceUnavailable => UNAVAILABLE_MESSAGE.to_owned(),
        ApiErrorKind::GatewayTimeout => GATEWAY_TIMEOUT_MESSAGE.to_owned(),
    }
}

/// Wraps every remote call's failure path.
pub struct ErrorPipeline {
    connectivity: Arc<dyn Connectivity>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn SessionStore>,
    fallback: Arc<dyn Navigator>,
    redirect_delay: Duration,
    navigator: Slot<dyn Navigator>,
    clearer: Slot<dyn SessionClearer>,
    redirect_pending: Arc<AtomicBool>,
}

impl std::fmt::Debug for ErrorPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPipeline")
            .field("redirect_delay", &self.redirect_delay)
            .field("navigator_wired", &read_slot(&self.navigator).is_some())
            .field("clearer_wired", &read_slot(&self.clearer).is_some())
            .finish_non_exhaustive()
    }
}

impl ErrorPipeline {
    #[must_use]
    pub fn new(
        connectivity: Arc<dyn Connectivity>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            connectivity,
            notifier,
            store,
            fallback: Arc::new(HardRedirect),
            redirect_delay: Duration::from_millis(DEFAULT_LOGOUT_REDIRECT_MS),
            navigator: Arc::new(RwLock::new(None)),
            clearer: Arc::new(RwLock::new(None)),
            redirect_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub const fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    #[must_use]
    pub fn with_fallback_navigator(mut self, fallback: Arc<dyn Navigator>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn set_navigator(&self, navigator: Arc<dyn Navigator>) {
        *self.navigator.write().unwrap_or_else(PoisonError::into_inner) = Some(navigator);
    }

    pub fn set_session_clearer(&self, clearer: Arc<dyn SessionClearer>) {
        *self.clearer.write().unwrap_or_else(PoisonError::into_inner) = Some(clearer);
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    #[must_use]
    pub fn classify(&self, raw: &RawApiError) -> ApiErrorKind {
        classify_with(raw, self.is_online())
    }

    /// Offline, fetch failure or timeout.
    #[must_use]
    pub fn is_network_error(&self, raw: &RawApiError) -> bool {
        !self.is_online()
            || raw.is_fetch_failure()
            || raw.status == Some(FailureStatus::TimeoutError)
    }

    /// Best human-readable text for a failure without notifying anyone.
    #[must_use]
    pub fn error_message(&self, raw: &RawApiError) -> String {
        if !self.is_online() {
            return OFFLINE_MESSAGE.to_owned();
        }
        raw.server_message()
            .or(raw.error.as_deref().filter(|e| !e.trim().is_empty()))
            .unwrap_or(GENERIC_MESSAGE)
            .to_owned()
    }

    /// Classifies, notifies once and returns the error for the caller to
    /// propagate. A 401 also tears the session down.
    pub fn handle(&self, raw: &RawApiError) -> ClassifiedError {
        let kind = self.classify(raw);
        let message = display_message(&kind, raw);
        tracing::debug!(?kind, status = ?raw.status, "api call failed");
        self.notifier.error(&message);
        if kind == ApiErrorKind::Unauthorized {
            self.teardown();
        }
        ClassifiedError { kind, message, status: raw.http_status() }
    }

    /// Clears the session and schedules the redirect to sign-in. Safe to
    /// call repeatedly and when nobody is signed in.
    pub fn teardown(&self) {
        let cleared = match read_slot(&self.clearer) {
            Some(clearer) => clearer.clear_session(),
            None => self.store.remove_user(),
        };
        if let Err(e) = cleared {
            tracing::warn!(error = %e, "session teardown failed, removing record directly");
            if let Err(e) = self.store.remove_user() {
                tracing::warn!(error = %e, "could not remove persisted session");
            }
        }
        self.schedule_redirect();
    }

    fn schedule_redirect(&self) {
        if self.redirect_pending.swap(true, Ordering::SeqCst) {
            tracing::debug!("sign-in redirect already pending");
            return;
        }
        let navigator = Arc::clone(&self.navigator);
        let fallback = Arc::clone(&self.fallback);
        let pending = Arc::clone(&self.redirect_pending);
        let redirect = move || {
            let target = read_slot(&navigator).unwrap_or(fallback);
            tracing::info!(path = SIGN_IN_PATH, "redirecting to sign-in");
            target.navigate(SIGN_IN_PATH);
            pending.store(false, Ordering::SeqCst);
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let delay = self.redirect_delay;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    redirect();
                });
            },
            Err(_) => redirect(),
        }
    }
}
