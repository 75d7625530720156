//! Request and response types for model generation.

use crate::{Message, Modality, Output};
use serde::{Deserialize, Serialize};

/// Provider-neutral generation request.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{GenerateRequest, Message, Modality};
///
/// let request = GenerateRequest {
///     messages: vec![Message::user("Write a story")],
///     temperature: Some(0.2),
///     max_tokens: Some(1024),
///     modalities: vec![Modality::Text, Modality::Image],
///     ..Default::default()
/// };
/// assert_eq!(request.messages.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Model identifier, overriding the driver's default
    pub model: Option<String>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold
    pub top_p: Option<f32>,
    /// Top-k sampling cutoff
    pub top_k: Option<u32>,
    /// Response modalities; empty means provider default (text)
    pub modalities: Vec<Modality>,
}

/// The unified response object.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{GenerateResponse, Output};
///
/// let response = GenerateResponse {
///     outputs: vec![
///         Output::Text("Once upon a time".to_string()),
///         Output::Image { mime: "image/png".to_string(), data: vec![1, 2, 3] },
///         Output::Text(" there was a goat.".to_string()),
///     ],
/// };
/// assert_eq!(response.text(), "Once upon a time there was a goat.");
/// assert_eq!(response.images().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GenerateResponse {
    /// The generated outputs in the order the model produced them
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Concatenation of every text output.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .filter_map(|o| match o {
                Output::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Image outputs as `(mime, bytes)` pairs.
    pub fn images(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.outputs.iter().filter_map(|o| match o {
            Output::Image { mime, data } => Some((mime.as_str(), data.as_slice())),
            _ => None,
        })
    }
}

/// Text-to-speech request for one paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Text to speak
    pub text: String,
    /// Voice name, if the provider supports several
    pub voice: Option<String>,
}

/// Raw synthesized speech.
///
/// Samples are signed 16-bit little-endian mono PCM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechAudio {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// PCM samples
    pub samples: Vec<i16>,
}

impl SpeechAudio {
    /// Decode little-endian s16 PCM bytes. A trailing odd byte is dropped.
    pub fn from_le_bytes(sample_rate: u32, bytes: &[u8]) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self {
            sample_rate,
            samples,
        }
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
