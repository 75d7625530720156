//! Output types from model responses.

use serde::{Deserialize, Serialize};

/// One piece of generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output.
    Text(String),

    /// Generated image output.
    Image {
        /// MIME type of the image
        mime: String,
        /// Binary image data
        data: Vec<u8>,
    },

    /// Generated audio output.
    Audio {
        /// MIME type of the audio, e.g. "audio/L16;codec=pcm;rate=24000"
        mime: String,
        /// Binary audio data
        data: Vec<u8>,
    },
}
