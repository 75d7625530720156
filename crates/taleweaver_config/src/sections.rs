//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Model identifiers and endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelsConfig {
    /// Base URL of the Generative Language REST API
    pub api_base: String,
    /// Model that writes scene prompts
    pub prompt_model: String,
    /// Model that writes the story with inline illustrations
    pub story_model: String,
    /// Model that writes title, description and tags
    pub seo_model: String,
    /// Speech model for the gemini audio backend
    pub tts_model: String,
    /// Per-request timeout
    pub request_timeout_secs: u64,
}

/// Story generation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Prompt used when none is given
    pub default_prompt: String,
    /// Ask the prompt model to rewrite the input prompt first
    pub use_prompt_generator: bool,
    /// Prefer streaming calls
    pub stream: bool,
    /// Story segments and images required for a run to count as complete
    pub min_story_segments: usize,
    /// Whole-pipeline attempts
    pub max_pipeline_attempts: usize,
    /// Pause between whole-pipeline attempts
    pub pipeline_retry_delay_secs: u64,
    /// Sampling temperature for prompt and story calls
    pub temperature: f32,
    /// Nucleus sampling threshold
    pub top_p: f32,
    /// Top-k sampling cutoff
    pub top_k: u32,
    /// Output token cap for prompt and story calls
    pub max_output_tokens: u32,
    /// Sampling temperature for metadata calls
    pub seo_temperature: f32,
    /// Output token cap for metadata calls
    pub seo_max_output_tokens: u32,
}

/// Backoff parameters for remote calls.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Failure budget before giving up
    pub max_failures: u32,
    /// Delay after the first failure
    pub initial_delay_secs: f64,
    /// Upper bound for the doubled delay
    pub max_delay_secs: f64,
    /// Delay applied after a quota error
    pub quota_delay_secs: f64,
    /// Extra budget charged for an invalid request
    pub invalid_request_penalty: u32,
}

/// One provider safety filter threshold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct SafetySetting {
    /// Harm category, e.g. `HARM_CATEGORY_HARASSMENT`
    pub category: String,
    /// Threshold, e.g. `BLOCK_NONE`
    pub threshold: String,
}

/// Which speech synthesizer narrates the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    /// Gemini speech model over REST
    #[display("gemini")]
    Gemini,
    /// Local TTS program writing raw PCM to stdout
    #[display("command")]
    Command,
}

/// Narration settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AudioConfig {
    /// Synthesizer to use
    pub backend: SpeechBackend,
    /// Voice name passed to the synthesizer
    pub voice: String,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Silence inserted between paragraphs
    pub gap_secs: f64,
    /// Program for the command backend
    pub command: String,
    /// Arguments for the command backend
    pub command_args: Vec<String>,
}

/// Slideshow encoding settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VideoConfig {
    /// FFmpeg executable
    pub ffmpeg: String,
    /// FFprobe executable
    pub ffprobe: String,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Output frame rate
    pub fps: u32,
    /// Fade in/out length per image
    pub fade_secs: f64,
    /// Quality of resized JPEG frames
    pub jpeg_quality: u8,
    /// Target video bitrate
    pub video_bitrate: String,
    /// Peak video bitrate
    pub max_bitrate: String,
    /// Rate control buffer
    pub buffer_size: String,
}

/// Thumbnail layout.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ThumbnailConfig {
    /// Thumbnail width
    pub width: u32,
    /// Thumbnail height
    pub height: u32,
    /// Height of the bottom title band
    pub title_band: u32,
    /// Title font size
    pub title_font_size: u32,
    /// Height of the top banner band
    pub banner_band: u32,
    /// Banner font size
    pub banner_font_size: u32,
    /// Banner text
    pub banner: String,
    /// Font files tried in order
    pub fonts: Vec<PathBuf>,
}

/// Google Drive publishing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DriveConfig {
    /// Upload results after each run
    pub enabled: bool,
    /// Run the access check before generating
    pub check_before_run: bool,
    /// Authorized-user token file
    pub token_path: PathBuf,
    /// Shared Drive file id to download the token file from when missing
    pub token_file_id: String,
    /// Folder name used when the title is empty
    pub default_folder: String,
    /// Base URL of the Google APIs
    pub api_base: String,
}

impl DriveConfig {
    /// Shared token file id, when configured.
    pub fn token_file_id(&self) -> Option<&str> {
        Some(self.token_file_id.trim()).filter(|id| !id.is_empty())
    }
}

/// Where run directories are created.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Parent of run directories; empty means the system temp directory
    pub root: String,
}

impl OutputConfig {
    /// Resolved parent directory for run directories.
    pub fn root_dir(&self) -> PathBuf {
        if self.root.trim().is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.root)
        }
    }
}
