//! Gemini text-to-speech.

use crate::gemini::{
    GeminiClient,
    conversion::{outputs_from_response, pcm_rate},
    wire::{
        Content, GenerateContentRequest, GenerationConfig, Part, PrebuiltVoiceConfig,
        SpeechConfig, VoiceConfig,
    },
};
use async_trait::async_trait;
use taleweaver_core::{Output, SpeechAudio, SpeechRequest};
use taleweaver_error::{GeminiError, GeminiErrorKind, TaleweaverResult};
use taleweaver_interface::SpeechSynthesizer;
use tracing::{debug, instrument, warn};

/// Speech synthesizer backed by a Gemini TTS model.
///
/// The API returns signed 16-bit mono PCM; the rate is read from the MIME
/// type and defaults to the configured rate when absent.
#[derive(Debug, Clone)]
pub struct GeminiSpeech {
    client: GeminiClient,
    voice: String,
    sample_rate: u32,
}

impl GeminiSpeech {
    /// Speech synthesizer using `client`'s model and credentials.
    pub fn new(client: GeminiClient, voice: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            client,
            voice: voice.into(),
            sample_rate,
        }
    }

    fn request_body(&self, req: &SpeechRequest) -> GenerateContentRequest {
        let voice = req.voice.clone().unwrap_or_else(|| self.voice.clone());
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(req.text.clone()),
                    ..Default::default()
                }],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig { voice_name: voice },
                    },
                }),
                ..Default::default()
            }),
            safety_settings: Vec::new(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiSpeech {
    #[instrument(skip(self, req), fields(chars = req.text.len()))]
    async fn synthesize(&self, req: &SpeechRequest) -> TaleweaverResult<SpeechAudio> {
        use taleweaver_interface::ContentDriver;

        let model = self.client.model_name().to_string();
        let response = self
            .client
            .post_generate(&model, &self.request_body(req))
            .await?;
        let (outputs, _) = outputs_from_response(&response)?;

        let mut rate = None;
        let mut pcm = Vec::new();
        for output in outputs {
            if let Output::Audio { mime, data } = output {
                let chunk_rate = pcm_rate(&mime).unwrap_or(self.sample_rate);
                if *rate.get_or_insert(chunk_rate) != chunk_rate {
                    warn!(mime = %mime, "Ignoring audio part with a different sample rate");
                    continue;
                }
                pcm.extend_from_slice(&data);
            }
        }

        let Some(rate) = rate else {
            return Err(GeminiError::new(GeminiErrorKind::EmptyResponse(model)).into());
        };
        let audio = SpeechAudio::from_le_bytes(rate, &pcm);
        debug!(
            samples = audio.samples.len(),
            duration_secs = audio.duration_secs(),
            "Speech synthesized"
        );
        Ok(audio)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
