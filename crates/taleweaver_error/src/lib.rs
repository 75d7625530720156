//! Error types for Taleweaver.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Provider errors also implement [`ClassifyFailure`], which the retry
//! wrapper uses to weight failures against its budget.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod drive;
mod error;
mod failure;
mod gemini;
mod json;
mod media;
mod story;

pub use config::ConfigError;
pub use drive::{DriveError, DriveErrorKind};
pub use error::{TaleweaverError, TaleweaverErrorKind, TaleweaverResult};
pub use failure::{ClassifyFailure, FailureClass};
pub use gemini::{GeminiError, GeminiErrorKind};
pub use json::JsonError;
pub use media::{MediaError, MediaErrorKind};
pub use story::{StoryError, StoryErrorKind};
