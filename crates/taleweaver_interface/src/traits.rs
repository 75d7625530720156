//! Capability traits implemented by model drivers.

use crate::StreamChunk;
use async_trait::async_trait;
use futures_util::stream::{Stream, StreamExt};
use std::pin::Pin;
use taleweaver_core::{GenerateRequest, GenerateResponse, Output, SpeechAudio, SpeechRequest};
use taleweaver_error::TaleweaverResult;

/// Boxed stream of response chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = TaleweaverResult<StreamChunk>> + Send>>;

/// Core trait every generative backend implements.
#[async_trait]
pub trait ContentDriver: Send + Sync {
    /// Generate model output given a multimodal request.
    async fn generate(&self, req: &GenerateRequest) -> TaleweaverResult<GenerateResponse>;

    /// Provider name (e.g. "gemini").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier.
    fn model_name(&self) -> &str;
}

/// Backends that can stream partial output.
#[async_trait]
pub trait Streaming: ContentDriver {
    /// Generate a streaming response.
    ///
    /// Returns a stream that yields chunks as they arrive from the API.
    async fn generate_stream(&self, req: &GenerateRequest) -> TaleweaverResult<ChunkStream>;
}

/// Backends that turn text into speech.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one paragraph.
    async fn synthesize(&self, req: &SpeechRequest) -> TaleweaverResult<SpeechAudio>;

    /// Sample rate of the returned audio.
    fn sample_rate(&self) -> u32;
}

/// Drain a chunk stream into a single response.
///
/// Adjacent text deltas are merged; images keep their position relative to
/// the text around them. The first error aborts collection.
pub async fn collect_stream(mut stream: ChunkStream) -> TaleweaverResult<GenerateResponse> {
    let mut outputs: Vec<Output> = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let Output::Text(delta) = &chunk.content {
            if let Some(Output::Text(acc)) = outputs.last_mut() {
                acc.push_str(delta);
                continue;
            }
        }
        outputs.push(chunk.content);
    }
    Ok(GenerateResponse { outputs })
}
