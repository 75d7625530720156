//! Streaming types shared by drivers.

use serde::{Deserialize, Serialize};

/// One increment of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Incremental content (a text delta or a complete inline image).
    pub content: taleweaver_core::Output,
    /// Whether this is the final chunk.
    pub is_final: bool,
    /// Optional finish reason if final.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// Why generation stopped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum FinishReason {
    /// Model completed naturally.
    Stop,
    /// Hit max_tokens limit.
    Length,
    /// Output was withheld by safety filters.
    Safety,
    /// Other/unknown reason.
    Other,
}

impl FinishReason {
    /// Map a provider finish reason string.
    ///
    /// # Examples
    ///
    /// ```
    /// use taleweaver_interface::FinishReason;
    ///
    /// assert_eq!(FinishReason::from_provider("STOP"), FinishReason::Stop);
    /// assert_eq!(FinishReason::from_provider("IMAGE_SAFETY"), FinishReason::Safety);
    /// ```
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::Length,
            r if r.contains("SAFETY") || r == "PROHIBITED_CONTENT" || r == "BLOCKLIST" => {
                FinishReason::Safety
            }
            _ => FinishReason::Other,
        }
    }
}
