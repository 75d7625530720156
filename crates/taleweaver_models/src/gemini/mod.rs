//! Gemini provider.
//!
//! Talks to the Generative Language REST API directly:
//! `models/{model}:generateContent` for whole responses and
//! `models/{model}:streamGenerateContent?alt=sse` for streamed text with
//! inline images. Speech uses the same endpoint with the `AUDIO` modality.

mod client;
mod conversion;
mod speech;
mod sse;
pub mod wire;

pub use client::GeminiClient;
pub use conversion::{http_error, outputs_from_response, pcm_rate, to_wire_request};
pub use speech::GeminiSpeech;
pub use sse::SseDecoder;
