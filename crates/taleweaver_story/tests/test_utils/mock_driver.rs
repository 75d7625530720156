//! Scripted model driver.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taleweaver_core::{GenerateRequest, GenerateResponse, Output};
use taleweaver_error::{GeminiError, GeminiErrorKind, TaleweaverResult};
use taleweaver_interface::{ChunkStream, ContentDriver, StreamChunk, Streaming};
use taleweaver_retry::RetryPolicy;

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(Vec<Output>),
    Error(GeminiErrorKind),
}

/// A recorded call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub streamed: bool,
    pub request: GenerateRequest,
}

/// Driver replaying a sequence of responses; the last one repeats.
#[derive(Clone)]
pub struct MockDriver {
    responses: Arc<Vec<MockResponse>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockDriver {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Arc::new(responses),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn always(response: MockResponse) -> Self {
        Self::new(vec![response])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, req: &GenerateRequest, streamed: bool) -> TaleweaverResult<Vec<Output>> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len().min(self.responses.len().saturating_sub(1));
        calls.push(RecordedCall {
            streamed,
            request: req.clone(),
        });
        match self.responses.get(index) {
            Some(MockResponse::Success(outputs)) => Ok(outputs.clone()),
            Some(MockResponse::Error(kind)) => Err(GeminiError::new(kind.clone()).into()),
            None => Err(GeminiError::new(GeminiErrorKind::EmptyResponse("mock".into())).into()),
        }
    }
}

#[async_trait]
impl ContentDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> TaleweaverResult<GenerateResponse> {
        let outputs = self.next(req, false)?;
        Ok(GenerateResponse { outputs })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

#[async_trait]
impl Streaming for MockDriver {
    async fn generate_stream(&self, req: &GenerateRequest) -> TaleweaverResult<ChunkStream> {
        let outputs = self.next(req, true)?;
        let last = outputs.len().saturating_sub(1);
        let chunks: Vec<TaleweaverResult<StreamChunk>> = outputs
            .into_iter()
            .enumerate()
            .map(|(i, content)| {
                Ok(StreamChunk {
                    content,
                    is_final: i == last,
                    finish_reason: None,
                })
            })
            .collect();
        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}

pub fn text_output(text: &str) -> Output {
    Output::Text(text.to_string())
}

pub fn image_output(byte: u8) -> Output {
    Output::Image {
        mime: "image/png".to_string(),
        data: vec![byte; 8],
    }
}

/// Policy that never sleeps.
pub fn zero_delay_policy(max_failures: u32) -> RetryPolicy {
    RetryPolicy::builder()
        .max_failures(max_failures)
        .initial_delay(Duration::ZERO)
        .quota_delay(Duration::ZERO)
        .build()
        .unwrap()
}
