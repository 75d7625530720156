//! Gemini client over the Generative Language REST API.

use crate::gemini::{
    SseDecoder,
    conversion::{http_error, outputs_from_response, to_wire_request},
    wire::{GenerateContentRequest, GenerateContentResponse, SafetySetting},
};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;
use taleweaver_config::{ModelsConfig, SafetySetting as SafetyConfig};
use taleweaver_core::{GenerateRequest, GenerateResponse, Output};
use taleweaver_error::{GeminiError, GeminiErrorKind, TaleweaverError, TaleweaverResult};
use taleweaver_interface::{ChunkStream, ContentDriver, StreamChunk, Streaming};
use tracing::{debug, instrument, warn};

/// Client for one Gemini model.
///
/// Cheap to clone; [`with_model`](Self::with_model) shares the HTTP pool.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    safety: Vec<SafetySetting>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the HTTP client cannot be built.
    #[instrument(skip_all, fields(base_url = %models.api_base))]
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        models: &ModelsConfig,
        safety: &[SafetyConfig],
    ) -> TaleweaverResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GeminiError::new(GeminiErrorKind::MissingApiKey).into());
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(models.request_timeout_secs))
            .build()
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;
        Ok(Self {
            http,
            api_key,
            base_url: models.api_base.trim_end_matches('/').to_string(),
            model: model.into(),
            safety: safety
                .iter()
                .map(|s| SafetySetting {
                    category: s.category.clone(),
                    threshold: s.threshold.clone(),
                })
                .collect(),
        })
    }

    /// Same credentials and connection pool, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    fn resolve_model<'a>(&'a self, req: &'a GenerateRequest) -> &'a str {
        req.model.as_deref().unwrap_or(&self.model)
    }

    /// POST a raw REST body and return the parsed response.
    #[instrument(skip(self, body))]
    pub(crate) async fn post_generate(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> TaleweaverResult<GenerateContentResponse> {
        let url = self.endpoint(model, "generateContent");
        debug!(url = %url, "Sending Gemini request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Gemini request failed");
            return Err(http_error(status.as_u16(), &text).into());
        }

        serde_json::from_str(&text).map_err(|e| {
            GeminiError::new(GeminiErrorKind::InvalidResponse(format!(
                "{}: {}",
                e,
                text.chars().take(200).collect::<String>()
            )))
            .into()
        })
    }
}

#[async_trait]
impl ContentDriver for GeminiClient {
    #[instrument(skip(self, req))]
    async fn generate(&self, req: &GenerateRequest) -> TaleweaverResult<GenerateResponse> {
        let model = self.resolve_model(req);
        let body = to_wire_request(req, &self.safety);
        let response = self.post_generate(model, &body).await?;
        let (outputs, finish_reason) = outputs_from_response(&response)?;
        if outputs.is_empty() {
            return Err(GeminiError::new(GeminiErrorKind::EmptyResponse(model.to_string())).into());
        }
        debug!(parts = outputs.len(), finish_reason = ?finish_reason, "Gemini response received");
        Ok(GenerateResponse { outputs })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Streaming for GeminiClient {
    #[instrument(skip(self, req))]
    async fn generate_stream(&self, req: &GenerateRequest) -> TaleweaverResult<ChunkStream> {
        let model = self.resolve_model(req).to_string();
        let body = to_wire_request(req, &self.safety);
        let url = format!("{}?alt=sse", self.endpoint(&model, "streamGenerateContent"));
        debug!(url = %url, "Opening Gemini stream");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini stream request failed");
            return Err(http_error(status.as_u16(), &text).into());
        }

        let stream = async_stream::try_stream! {
            let mut decoder = SseDecoder::default();
            let mut bytes = response.bytes_stream();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| {
                    TaleweaverError::from(GeminiError::new(GeminiErrorKind::StreamInterrupted(
                        e.to_string(),
                    )))
                })?;
                for event in decoder.push(&chunk) {
                    for item in chunks_from_event(&event)? {
                        yield item;
                    }
                }
            }
            if let Some(event) = decoder.finish() {
                for item in chunks_from_event(&event)? {
                    yield item;
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Turn one SSE event payload into stream chunks.
fn chunks_from_event(event: &str) -> TaleweaverResult<Vec<StreamChunk>> {
    let response: GenerateContentResponse = serde_json::from_str(event).map_err(|e| {
        TaleweaverError::from(GeminiError::new(GeminiErrorKind::InvalidResponse(
            e.to_string(),
        )))
    })?;
    let (outputs, finish_reason) = outputs_from_response(&response)?;

    let mut chunks: Vec<StreamChunk> = outputs
        .into_iter()
        .map(|content| StreamChunk {
            content,
            is_final: false,
            finish_reason: None,
        })
        .collect();
    if let Some(reason) = finish_reason {
        match chunks.last_mut() {
            Some(last) => {
                last.is_final = true;
                last.finish_reason = Some(reason);
            }
            None => chunks.push(StreamChunk {
                content: Output::Text(String::new()),
                is_final: true,
                finish_reason: Some(reason),
            }),
        }
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweaver_interface::FinishReason;

    #[test]
    fn test_final_event_marks_last_chunk() {
        let event = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"The end."}]},"finishReason":"STOP"}]}"#;
        let chunks = chunks_from_event(event).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_final);
        assert_eq!(chunks[0].finish_reason, Some(FinishReason::Stop));
    }

    #[test]
    fn test_finish_without_content_yields_empty_final_chunk() {
        let event = r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#;
        let chunks = chunks_from_event(event).unwrap();
        assert_eq!(chunks[0].content, Output::Text(String::new()));
        assert_eq!(chunks[0].finish_reason, Some(FinishReason::Length));
    }

    #[test]
    fn test_malformed_event_is_error() {
        assert!(chunks_from_event("{not json").is_err());
    }
}
