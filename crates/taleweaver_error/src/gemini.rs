//! Gemini-specific error types.

use crate::{ClassifyFailure, FailureClass};

/// Gemini-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GeminiErrorKind {
    /// No API key configured
    #[display("No Gemini API key configured (set GEMINI_API_KEYS or GEMINI_API_KEY)")]
    MissingApiKey,
    /// Request could not be sent or the body could not be read
    #[display("Gemini API request failed: {}", _0)]
    ApiRequest(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Response body did not match the expected shape
    #[display("Invalid response payload: {}", _0)]
    InvalidResponse(String),
    /// Base64 decoding failed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
    /// Model returned no usable candidates
    #[display("Empty response from model {}", _0)]
    EmptyResponse(String),
    /// Prompt or candidate was blocked by the safety filters
    #[display("Blocked by safety filters: {}", _0)]
    SafetyBlocked(String),
    /// Stream was interrupted
    #[display("Stream interrupted: {}", _0)]
    StreamInterrupted(String),
}

impl GeminiErrorKind {
    /// Failure class used by the retry wrapper.
    pub fn failure_class(&self) -> FailureClass {
        match self {
            GeminiErrorKind::HttpError {
                status_code,
                message,
            } => FailureClass::from_status(*status_code, message),
            GeminiErrorKind::SafetyBlocked(_) => FailureClass::SafetyBlocked,
            GeminiErrorKind::MissingApiKey => FailureClass::InvalidRequest,
            _ => FailureClass::Other,
        }
    }
}

/// Gemini error with source location tracking.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{GeminiError, GeminiErrorKind};
///
/// let err = GeminiError::new(GeminiErrorKind::MissingApiKey);
/// assert!(format!("{}", err).contains("GEMINI_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gemini Error: {} at line {} in {}", kind, line, file)]
pub struct GeminiError {
    /// The kind of error that occurred
    pub kind: GeminiErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GeminiError {
    /// Create a new GeminiError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GeminiErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl ClassifyFailure for GeminiError {
    fn failure_class(&self) -> FailureClass {
        self.kind.failure_class()
    }
}
