//! Story generation error types.

/// Kinds of story generation errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoryErrorKind {
    /// Model produced no story text
    #[display("Model returned no story text")]
    EmptyText,
    /// Model produced no illustrations
    #[display("Model returned no images")]
    NoImages,
    /// Output fell short of the completeness threshold
    #[display("Incomplete story: {} segments, {} images (need {})", segments, images, required)]
    Incomplete {
        /// Story segments produced
        segments: usize,
        /// Images produced
        images: usize,
        /// Required minimum of each
        required: usize,
    },
    /// No JSON object found in a model reply
    #[display("No JSON found in model output: {}", _0)]
    NoJson(String),
    /// Model reply could not be parsed
    #[display("Failed to parse model output: {}", _0)]
    Parse(String),
    /// Every generation attempt failed
    #[display("Gave up after {} attempts", _0)]
    Exhausted(usize),
}

/// Story error with location tracking.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{StoryError, StoryErrorKind};
///
/// let err = StoryError::new(StoryErrorKind::Incomplete { segments: 2, images: 4, required: 6 });
/// assert!(format!("{}", err).contains("2 segments"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Story Error: {} at line {} in {}", kind, line, file)]
pub struct StoryError {
    /// The kind of error that occurred
    pub kind: StoryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoryError {
    /// Create a new story error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
