//! Configuration and secrets for Taleweaver.
//!
//! Tunables live in TOML with bundled defaults; API keys only ever come from
//! the environment.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod secrets;
mod sections;

pub use config::TaleweaverConfig;
pub use secrets::{ApiKeys, KEY_VAR, KEYS_VAR, redact};
pub use sections::{
    AudioConfig, DriveConfig, GenerationConfig, ModelsConfig, OutputConfig, RetryConfig,
    SafetySetting, SpeechBackend, ThumbnailConfig, VideoConfig,
};
