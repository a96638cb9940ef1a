//! Typed errors for the API crate: raw transport failures, their
//! classification and the user-facing classified error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport-level outcome of a failed call: an HTTP status or one of the
/// sentinel failures raised before a status was available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireStatus", into = "WireStatus")]
pub enum FailureStatus {
    Http(u16),
    FetchError,
    TimeoutError,
    ParsingError,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireStatus {
    Code(u16),
    Sentinel(String),
}

impl TryFrom<WireStatus> for FailureStatus {
    type Error = String;

    fn try_from(value: WireStatus) -> Result<Self, Self::Error> {
        match value {
            WireStatus::Code(code) => Ok(Self::Http(code)),
            WireStatus::Sentinel(s) => match s.as_str() {
                "FETCH_ERROR" => Ok(Self::FetchError),
                "TIMEOUT_ERROR" => Ok(Self::TimeoutError),
                "PARSING_ERROR" => Ok(Self::ParsingError),
                other => Err(format!("unknown failure status: {other}")),
            },
        }
    }
}

impl From<FailureStatus> for WireStatus {
    fn from(value: FailureStatus) -> Self {
        match value {
            FailureStatus::Http(code) => Self::Code(code),
            FailureStatus::FetchError => Self::Sentinel("FETCH_ERROR".to_owned()),
            FailureStatus::TimeoutError => Self::Sentinel("TIMEOUT_ERROR".to_owned()),
            FailureStatus::ParsingError => Self::Sentinel("PARSING_ERROR".to_owned()),
        }
    }
}

/// JSON body the server sends with a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, rename = "statusCode")]
    pub status_code: Option<u16>,
}

/// A failed remote call before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawApiError {
    #[serde(default)]
    pub status: Option<FailureStatus>,
    #[serde(default)]
    pub data: Option<ErrorBody>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RawApiError {
    #[must_use]
    pub fn http(code: u16, data: Option<ErrorBody>) -> Self {
        Self { status: Some(FailureStatus::Http(code)), data, ..Self::default() }
    }

    #[must_use]
    pub fn fetch(error: impl Into<String>) -> Self {
        Self { status: Some(FailureStatus::FetchError), error: Some(error.into()), ..Self::default() }
    }

    #[must_use]
    pub fn timeout() -> Self {
        Self { status: Some(FailureStatus::TimeoutError), ..Self::default() }
    }

    #[must_use]
    pub fn parsing(error: impl Into<String>) -> Self {
        Self {
            status: Some(FailureStatus::ParsingError),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// HTTP status of the failure, falling back to the body's `statusCode`.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self.status {
            Some(FailureStatus::Http(code)) => Some(code),
            Some(_) => None,
            None => self.data.as_ref().and_then(|d| d.status_code),
        }
    }

    /// Server-supplied text: body `message`, then body `error`, then the
    /// top-level `message`. Blank strings are skipped.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        let body = self.data.as_ref();
        [
            body.and_then(|d| d.message.as_deref()),
            body.and_then(|d| d.error.as_deref()),
            self.message.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
    }

    /// Whether the transport reported a fetch-level failure. A parse or
    /// timeout sentinel is never one, whatever its `error` text says.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        match self.status {
            Some(FailureStatus::FetchError) => true,
            Some(FailureStatus::ParsingError | FailureStatus::TimeoutError) => false,
            _ => self.error.as_deref().is_some_and(|e| e.contains("fetch")),
        }
    }
}

/// Closed classification of a failed call, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    Offline,
    NetworkFailure,
    Timeout,
    MalformedResponse,
    ClientError { status: u16, message: String },
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ValidationFailure,
    RateLimited,
    ServerError,
    ServiceUnavailable,
    GatewayTimeout,
    Unknown { message: String },
}

impl ApiErrorKind {
    /// Whether the failure happened before the server produced a response.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Offline | Self::NetworkFailure | Self::Timeout)
    }
}

/// A failed call after it went through the error pipeline: the kind plus
/// the single message that was shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClassifiedError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

/// Errors from the persisted session record.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("session file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("no location available for the session file")]
    NoLocation,
}

/// Errors while building the HTTP client.
#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("client initialization failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid base URL: {0}")]
    BaseUrl(String),
}
