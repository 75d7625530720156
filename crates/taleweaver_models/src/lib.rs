//! Model provider integrations for Taleweaver.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod gemini;

pub use gemini::{GeminiClient, GeminiSpeech};
