//! Top-level error wrapper types.

use crate::{
    ClassifyFailure, ConfigError, DriveError, FailureClass, GeminiError, JsonError, MediaError,
    StoryError,
};

/// Every error the pipeline can surface.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{ConfigError, TaleweaverError, TaleweaverErrorKind};
///
/// let err: TaleweaverError = ConfigError::new("retry.max_failures must be at least 1").into();
/// assert!(matches!(err.kind(), TaleweaverErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TaleweaverErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Gemini API error
    #[from(GeminiError)]
    Gemini(GeminiError),
    /// Image, audio or FFmpeg error
    #[from(MediaError)]
    Media(MediaError),
    /// Google Drive error
    #[from(DriveError)]
    Drive(DriveError),
    /// Story generation error
    #[from(StoryError)]
    Story(StoryError),
}

/// Taleweaver error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Taleweaver Error: {}", _0)]
pub struct TaleweaverError(Box<TaleweaverErrorKind>);

impl TaleweaverError {
    /// Create a new error from a kind.
    pub fn new(kind: TaleweaverErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TaleweaverErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to TaleweaverErrorKind
impl<T> From<T> for TaleweaverError
where
    T: Into<TaleweaverErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl ClassifyFailure for TaleweaverError {
    fn failure_class(&self) -> FailureClass {
        match self.kind() {
            TaleweaverErrorKind::Gemini(e) => e.failure_class(),
            TaleweaverErrorKind::Drive(e) => e.failure_class(),
            _ => FailureClass::Other,
        }
    }
}

/// Result type for Taleweaver operations.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{StoryError, StoryErrorKind, TaleweaverResult};
///
/// fn story_text() -> TaleweaverResult<String> {
///     Err(StoryError::new(StoryErrorKind::EmptyText))?
/// }
/// assert!(story_text().is_err());
/// ```
pub type TaleweaverResult<T> = std::result::Result<T, TaleweaverError>;
