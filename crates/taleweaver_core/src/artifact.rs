//! Audio, video, metadata and upload artifacts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Longest title the publishing platform accepts.
pub const MAX_TITLE_CHARS: usize = 60;

/// Narration track assembled from per-paragraph segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct AudioTrack {
    path: PathBuf,
    segments: Vec<PathBuf>,
    duration_secs: f64,
}

impl AudioTrack {
    /// Describe a combined narration file.
    pub fn new(path: PathBuf, segments: Vec<PathBuf>, duration_secs: f64) -> Self {
        Self {
            path,
            segments,
            duration_secs,
        }
    }
}

/// Which FFmpeg filter graph produced a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum FilterPath {
    /// Per-image fades joined by concat
    #[display("fade")]
    Primary,
    /// Plain concat after the primary graph failed
    #[display("concat fallback")]
    Fallback,
}

/// Encoded slideshow video.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct VideoArtifact {
    path: PathBuf,
    filter: FilterPath,
    #[setters(strip_option)]
    duration_secs: Option<f64>,
    #[setters(strip_option)]
    size_bytes: Option<u64>,
}

impl VideoArtifact {
    /// Video at `path` produced by `filter`, not yet probed.
    pub fn new(path: PathBuf, filter: FilterPath) -> Self {
        Self {
            path,
            filter,
            duration_secs: None,
            size_bytes: None,
        }
    }
}

/// Title, description and tags for publishing.
///
/// # Examples
///
/// ```
/// use taleweaver_core::VideoMetadata;
///
/// let meta = VideoMetadata::new("x".repeat(80), "A story", vec!["kids".into()]);
/// assert_eq!(meta.title.chars().count(), 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video title, at most [`MAX_TITLE_CHARS`] characters
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Ordered tags
    pub tags: Vec<String>,
}

impl VideoMetadata {
    /// Build metadata, truncating the title to [`MAX_TITLE_CHARS`].
    pub fn new(title: impl Into<String>, description: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: truncate_chars(title.into().trim(), MAX_TITLE_CHARS),
            description: description.into(),
            tags,
        }
    }
}

/// First `max` characters of `text`, never splitting a character.
///
/// # Examples
///
/// ```
/// use taleweaver_core::truncate_chars;
///
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// assert_eq!(truncate_chars("hi", 10), "hi");
/// ```
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Identifiers returned after publishing a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct UploadReceipt {
    folder_id: String,
    video_id: String,
    video_link: Option<String>,
    metadata_id: Option<String>,
    thumbnail_id: Option<String>,
}

impl UploadReceipt {
    /// Assemble a receipt from uploaded file ids.
    pub fn new(
        folder_id: String,
        video_id: String,
        video_link: Option<String>,
        metadata_id: Option<String>,
        thumbnail_id: Option<String>,
    ) -> Self {
        Self {
            folder_id,
            video_id,
            video_link,
            metadata_id,
            thumbnail_id,
        }
    }
}
