//! Input types for model requests.

use serde::{Deserialize, Serialize};

/// One piece of request content.
///
/// # Examples
///
/// ```
/// use taleweaver_core::Input;
///
/// let text = Input::Text("Tell me a story".to_string());
/// let image = Input::Image {
///     mime: "image/png".to_string(),
///     data: vec![0x89, 0x50, 0x4E, 0x47],
/// };
/// assert!(matches!(text, Input::Text(_)));
/// assert!(matches!(image, Input::Image { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Input {
    /// Plain text input.
    Text(String),

    /// Inline image input.
    Image {
        /// MIME type, e.g. "image/png"
        mime: String,
        /// Raw image bytes
        data: Vec<u8>,
    },
}
