//! Response modalities a request may ask for.

use serde::{Deserialize, Serialize};

/// Kind of content a model is asked to return.
///
/// # Examples
///
/// ```
/// use taleweaver_core::Modality;
/// use strum::IntoEnumIterator;
///
/// assert_eq!(Modality::Image.to_string(), "IMAGE");
/// assert_eq!(Modality::iter().count(), 3);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    /// Text parts
    #[display("TEXT")]
    Text,
    /// Inline image parts
    #[display("IMAGE")]
    Image,
    /// Inline audio parts
    #[display("AUDIO")]
    Audio,
}
