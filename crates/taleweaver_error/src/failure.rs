//! Failure classification used by the retry wrapper.

/// Coarse category of a failed remote call.
///
/// The retry wrapper charges each class against its failure budget
/// differently and adjusts the backoff delay for quota errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FailureClass {
    /// The provider rejected the call for quota or rate reasons (HTTP 429)
    #[display("quota exhausted")]
    QuotaExhausted,
    /// The provider failed internally (HTTP 5xx)
    #[display("server error")]
    ServerError,
    /// The request itself was malformed (HTTP 400)
    #[display("invalid request")]
    InvalidRequest,
    /// The request or response was blocked by safety filters
    #[display("safety blocked")]
    SafetyBlocked,
    /// Anything else: transport failures, decode errors, empty responses
    #[display("other")]
    Other,
}

/// Errors that can report which [`FailureClass`] they belong to.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{ClassifyFailure, FailureClass, GeminiError, GeminiErrorKind};
///
/// let err = GeminiError::new(GeminiErrorKind::HttpError {
///     status_code: 429,
///     message: "Resource has been exhausted".to_string(),
/// });
/// assert_eq!(err.failure_class(), FailureClass::QuotaExhausted);
/// ```
pub trait ClassifyFailure {
    /// Category of this failure.
    fn failure_class(&self) -> FailureClass;
}

impl FailureClass {
    /// Classify an HTTP status code and response message.
    ///
    /// A 400 response is only counted as a safety block when its message
    /// mentions safety; otherwise it is an invalid request.
    pub fn from_status(status_code: u16, message: &str) -> Self {
        match status_code {
            429 => FailureClass::QuotaExhausted,
            500..=599 => FailureClass::ServerError,
            400 if message.to_lowercase().contains("safety") => FailureClass::SafetyBlocked,
            400 => FailureClass::InvalidRequest,
            _ => FailureClass::Other,
        }
    }
}
