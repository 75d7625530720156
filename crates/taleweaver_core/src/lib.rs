//! Core data types for Taleweaver.
//!
//! Request/response types shared by model drivers, plus the artifact
//! records each pipeline stage hands to the next.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod input;
mod message;
mod modality;
mod output;
mod request;
mod role;
mod run;
mod story;

pub use artifact::{
    AudioTrack, FilterPath, MAX_TITLE_CHARS, UploadReceipt, VideoArtifact, VideoMetadata,
    truncate_chars,
};
pub use input::Input;
pub use message::Message;
pub use modality::Modality;
pub use output::Output;
pub use request::{GenerateRequest, GenerateResponse, SpeechAudio, SpeechRequest};
pub use role::Role;
pub use run::StoryRun;
pub use story::{ImageSet, StoryText, image_file_name, sequence_number};
