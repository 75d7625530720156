//! Media processing error types (images, WAV audio, FFmpeg).

/// Kinds of media errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MediaErrorKind {
    /// Filesystem operation failed
    #[display("I/O error on {}: {}", path, message)]
    Io {
        /// Path being accessed
        path: String,
        /// Underlying error message
        message: String,
    },
    /// Image could not be decoded or encoded
    #[display("Image error: {}", _0)]
    Image(String),
    /// Font file could not be parsed
    #[display("Font error: {}", _0)]
    Font(String),
    /// WAV file could not be read or written
    #[display("WAV error: {}", _0)]
    Wav(String),
    /// External tool is not installed or could not be spawned
    #[display("Could not run {}: {}", tool, message)]
    ToolUnavailable {
        /// Tool name (ffmpeg, ffprobe)
        tool: String,
        /// Spawn error message
        message: String,
    },
    /// FFmpeg exited with a non-zero status
    #[display("ffmpeg exited with status {}: {}", status, stderr)]
    FfmpegFailed {
        /// Exit code, or -1 when killed by a signal
        status: i32,
        /// Tail of the captured stderr
        stderr: String,
    },
    /// FFprobe output could not be interpreted
    #[display("ffprobe failed: {}", _0)]
    ProbeFailed(String),
    /// Nothing to work with
    #[display("No input: {}", _0)]
    NoInput(String),
    /// Every synthesis attempt failed
    #[display("Speech synthesis produced no audio: {}", _0)]
    NoAudio(String),
}

/// Media error with location tracking.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{MediaError, MediaErrorKind};
///
/// let err = MediaError::new(MediaErrorKind::NoInput("no images".to_string()));
/// assert!(format!("{}", err).contains("no images"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Media Error: {} at line {} in {}", kind, line, file)]
pub struct MediaError {
    /// The kind of error that occurred
    pub kind: MediaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MediaError {
    /// Create a new media error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MediaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an I/O failure on `path`.
    #[track_caller]
    pub fn io(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::new(MediaErrorKind::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        })
    }
}
