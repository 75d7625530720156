//! JSON error types.

/// A document that could not be written or read as JSON.
///
/// # Examples
///
/// ```
/// use taleweaver_error::JsonError;
///
/// let err = JsonError::new("metadata.json", "key must be a string");
/// assert_eq!(err.document, "metadata.json");
/// assert!(err.to_string().starts_with("JSON Error in metadata.json: key must be a string"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error in {}: {} at line {} in {}", document, message, line, file)]
pub struct JsonError {
    /// Document being encoded or decoded (file name or payload label)
    pub document: String,
    /// Serializer message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Failure on `document`, located at the caller.
    #[track_caller]
    pub fn new(document: impl Into<String>, message: impl std::fmt::Display) -> Self {
        let location = std::panic::Location::caller();
        Self {
            document: document.into(),
            message: message.to_string(),
            line: location.line(),
            file: location.file(),
        }
    }
}
