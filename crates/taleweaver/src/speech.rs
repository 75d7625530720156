//! Narration backend chosen from configuration.

use async_trait::async_trait;
use taleweaver_config::{AudioConfig, SpeechBackend};
use taleweaver_core::{SpeechAudio, SpeechRequest};
use taleweaver_error::TaleweaverResult;
use taleweaver_interface::SpeechSynthesizer;
use taleweaver_media::CommandSpeech;
use taleweaver_models::{GeminiClient, GeminiSpeech};

/// Either of the supported speech synthesizers.
#[derive(Debug, Clone)]
pub enum SpeechEngine {
    /// Gemini speech model
    Gemini(GeminiSpeech),
    /// Local TTS program
    Command(CommandSpeech),
}

impl SpeechEngine {
    /// Engine for `[audio]`, reusing `client`'s credentials for the Gemini
    /// backend.
    pub fn from_config(audio: &AudioConfig, client: &GeminiClient, tts_model: &str) -> Self {
        match audio.backend {
            SpeechBackend::Gemini => Self::Gemini(GeminiSpeech::new(
                client.with_model(tts_model),
                audio.voice.clone(),
                audio.sample_rate,
            )),
            SpeechBackend::Command => Self::Command(CommandSpeech::from_config(audio)),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechEngine {
    async fn synthesize(&self, req: &SpeechRequest) -> TaleweaverResult<SpeechAudio> {
        match self {
            Self::Gemini(speech) => speech.synthesize(req).await,
            Self::Command(speech) => speech.synthesize(req).await,
        }
    }

    fn sample_rate(&self) -> u32 {
        match self {
            Self::Gemini(speech) => speech.sample_rate(),
            Self::Command(speech) => speech.sample_rate(),
        }
    }
}
