//! Taleweaver - narrated children's story videos from a single prompt.
//!
//! One run asks a text model for a scene prompt, streams an illustrated
//! story, narrates it paragraph by paragraph, renders a slideshow with
//! FFmpeg, writes publishing metadata and a thumbnail, and uploads the
//! result to Google Drive. Runs that come back short are retried from
//! scratch.
//!
//! # Architecture
//!
//! - `taleweaver_error` - error types
//! - `taleweaver_core` - requests, responses and run artifacts
//! - `taleweaver_interface` - model capability traits
//! - `taleweaver_config` - layered configuration and API keys
//! - `taleweaver_retry` - backoff for remote calls
//! - `taleweaver_models` - Gemini client
//! - `taleweaver_story` - prompt, story, segmentation and metadata stages
//! - `taleweaver_media` - narration, video and thumbnail stages
//! - `taleweaver_drive` - Google Drive publishing
//!
//! This crate wires the stages into a [`Pipeline`] and hosts the CLI.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
mod pipeline;
mod speech;
pub mod telemetry;

pub use cli::{Cli, Commands, GenerateArgs};
pub use pipeline::{Pipeline, StageDrivers, create_work_dir, run_with_retries};
pub use speech::SpeechEngine;

pub use taleweaver_config::TaleweaverConfig;
pub use taleweaver_core::{StoryRun, StoryText, VideoMetadata};
pub use taleweaver_error::{TaleweaverError, TaleweaverErrorKind, TaleweaverResult};
