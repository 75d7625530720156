//! Test doubles for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use taleweaver::{StageDrivers, TaleweaverConfig};
use taleweaver_core::{GenerateRequest, GenerateResponse, Output, SpeechAudio, SpeechRequest};
use taleweaver_error::{MediaError, MediaErrorKind, TaleweaverResult};
use taleweaver_interface::{ChunkStream, ContentDriver, SpeechSynthesizer, StreamChunk, Streaming};

/// Driver that answers every call with the same outputs.
#[derive(Clone)]
pub struct ScriptedDriver {
    outputs: Arc<Vec<Output>>,
    calls: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl ScriptedDriver {
    pub fn new(outputs: Vec<Output>) -> Self {
        Self {
            outputs: Arc::new(outputs),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(vec![Output::Text(text.to_string())])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<GenerateRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, req: &GenerateRequest) -> Vec<Output> {
        self.calls.lock().unwrap().push(req.clone());
        self.outputs.as_ref().clone()
    }
}

#[async_trait]
impl ContentDriver for ScriptedDriver {
    async fn generate(&self, req: &GenerateRequest) -> TaleweaverResult<GenerateResponse> {
        Ok(GenerateResponse {
            outputs: self.record(req),
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

#[async_trait]
impl Streaming for ScriptedDriver {
    async fn generate_stream(&self, req: &GenerateRequest) -> TaleweaverResult<ChunkStream> {
        let outputs = self.record(req);
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

/// Synthesizer returning a tenth of a second of silence, or failing.
#[derive(Clone)]
pub struct SilentSpeech {
    pub fail: bool,
}

#[async_trait]
impl SpeechSynthesizer for SilentSpeech {
    async fn synthesize(&self, _req: &SpeechRequest) -> TaleweaverResult<SpeechAudio> {
        if self.fail {
            return Err(MediaError::new(MediaErrorKind::NoAudio("speech offline".into())).into());
        }
        Ok(SpeechAudio::from_le_bytes(24_000, &[0u8; 4_800]))
    }

    fn sample_rate(&self) -> u32 {
        24_000
    }
}

/// Six scenes of story text followed by six illustrations.
pub fn six_scene_story() -> Vec<Output> {
    let mut outputs = Vec::new();
    for i in 1..=6 {
        outputs.push(Output::Text(format!(
            "Scene {}: Pip the little goat trotted across the sunny farm to visit friend number {}.\n\n",
            i, i
        )));
        outputs.push(Output::Image {
            mime: "image/png".to_string(),
            data: vec![i as u8; 8],
        });
    }
    outputs
}

pub fn drivers(prompt: &ScriptedDriver, story: &ScriptedDriver, seo: &ScriptedDriver) -> StageDrivers<ScriptedDriver> {
    StageDrivers {
        prompt: prompt.clone(),
        story: story.clone(),
        seo: seo.clone(),
    }
}

/// Bundled configuration writing runs under `root`, with FFmpeg pointed
/// at programs that do not exist.
pub fn test_config(root: &Path) -> TaleweaverConfig {
    let mut config = TaleweaverConfig::bundled().unwrap();
    config.output.root = root.display().to_string();
    config.generation.use_prompt_generator = false;
    config.generation.pipeline_retry_delay_secs = 0;
    config.retry.initial_delay_secs = 0.0;
    config.retry.quota_delay_secs = 0.0;
    config.retry.max_failures = 3;
    config.video.ffmpeg = "taleweaver-missing-ffmpeg".to_string();
    config.video.ffprobe = "taleweaver-missing-ffprobe".to_string();
    config.thumbnail.fonts = Vec::new();
    config.drive.enabled = false;
    config
}
