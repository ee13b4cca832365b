//! Error taxonomy for backend interactions.

use thiserror::Error;

/// Errors surfaced by console operations.
///
/// None of these are fatal: every operation recovers at the component
/// boundary, and the caller may retry with corrected input or restored
/// connectivity. Rejected login credentials are not an error at all - see
/// [`AuthOutcome`](crate::session::AuthOutcome).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed local input. Never reaches the network.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backend rejected the credential on a privileged call.
    ///
    /// The session has already been cleared when this is returned, so the
    /// dead credential is never retried.
    #[error("Credential rejected - signed out")]
    Unauthorized,

    /// The backend could not be reached (connectivity, timeout).
    #[error("Transport failure: {0}")]
    Transport(reqwest::Error),

    /// The backend refused the operation (e.g. an illegal transition).
    #[error("Backend rejected request: {0}")]
    Rejected(String),

    /// The backend answered with a body this client cannot decode.
    #[error("Malformed backend response: {0}")]
    Response(String),
}

impl ApiError {
    /// Whether retrying the same call unchanged can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Response(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Validation("payment link must not be empty".to_owned());
        assert_eq!(
            err.to_string(),
            "Validation failed: payment link must not be empty"
        );

        let err = ApiError::Rejected("invalid transition".to_owned());
        assert_eq!(err.to_string(), "Backend rejected request: invalid transition");

        let err = ApiError::Unauthorized;
        assert_eq!(err.to_string(), "Credential rejected - signed out");
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(!ApiError::Validation(String::new()).is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::Rejected(String::new()).is_retryable());
        assert!(!ApiError::Response(String::new()).is_retryable());
    }
}
