use stockdesk_api::ClassifiedError;
use thiserror::Error;

/// Why the last fetch left the list empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    /// The call failed; the pipeline has already shown the message.
    #[error(transparent)]
    Api(#[from] ClassifiedError),
    /// The transport succeeded but the envelope did not report success.
    #[error("{message}")]
    Rejected { code: u16, status: String, message: String },
}

impl RetrievalError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Api(e) => &e.message,
            Self::Rejected { message, .. } => message,
        }
    }
}
