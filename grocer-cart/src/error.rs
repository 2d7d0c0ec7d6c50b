//! Error types for the cart layer.

use thiserror::Error;

/// Result type for cart and backend operations.
pub type CartResult<T> = Result<T, CartError>;

/// Errors that can occur while talking to the bag backend.
///
/// The cart's own public operations never return these; they surface through
/// [`BagSession::refresh`](crate::BagSession::refresh), the backend trait,
/// and as the reason text of a [`CartNotice`](crate::CartNotice).
#[derive(Debug, Error)]
pub enum CartError {
    /// Transport failure (connect, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered 2xx but reported `success: false`.
    #[error("the server declined the change")]
    Declined,

    /// The response body did not pass validation.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CartError {
    /// Returns true if the server refused the change itself, as opposed to
    /// the request never getting a usable answer.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CartError::Rejected { .. } | CartError::Declined)
    }

    /// HTTP status of a rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CartError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<grocer_types::Error> for CartError {
    fn from(err: grocer_types::Error) -> Self {
        match err {
            grocer_types::Error::Serialization(e) => CartError::Serialization(e),
            other => CartError::InvalidResponse(other.to_string()),
        }
    }
}
