//! Google Drive error types.

use crate::{ClassifyFailure, FailureClass};

/// Kinds of Drive errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DriveErrorKind {
    /// Token file missing or unreadable
    #[display("Drive credentials unavailable: {}", _0)]
    Credentials(String),
    /// OAuth refresh failed
    #[display("Token refresh failed: {}", _0)]
    TokenRefresh(String),
    /// Drive API returned an error status
    #[display("Drive API HTTP {} error: {}", status_code, message)]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },
    /// Transport failure
    #[display("Drive request failed: {}", _0)]
    Request(String),
    /// Resumable upload could not be started or completed
    #[display("Upload of {} failed: {}", name, message)]
    Upload {
        /// File name being uploaded
        name: String,
        /// Failure description
        message: String,
    },
}

/// Drive error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Drive Error: {} at line {} in {}", kind, line, file)]
pub struct DriveError {
    /// The kind of error that occurred
    pub kind: DriveErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DriveError {
    /// Create a new Drive error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DriveErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl ClassifyFailure for DriveError {
    fn failure_class(&self) -> FailureClass {
        match &self.kind {
            DriveErrorKind::Api {
                status_code,
                message,
            } => FailureClass::from_status(*status_code, message),
            _ => FailureClass::Other,
        }
    }
}
