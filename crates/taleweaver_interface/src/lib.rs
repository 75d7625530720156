//! Trait definitions for Taleweaver model backends.
//!
//! Pipeline stages depend on these traits rather than on a concrete
//! provider, which keeps them testable with scripted mocks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{ChunkStream, ContentDriver, SpeechSynthesizer, Streaming, collect_stream};
pub use types::{FinishReason, StreamChunk};
