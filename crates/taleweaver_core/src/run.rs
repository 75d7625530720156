//! Everything one pipeline attempt produced.

use crate::{AudioTrack, ImageSet, StoryText, UploadReceipt, VideoArtifact, VideoMetadata};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Artifacts of one attempt.
///
/// Later stages are optional: a run whose narration or video failed is
/// still returned so the caller can judge completeness.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct StoryRun {
    #[setters(skip)]
    work_dir: PathBuf,
    #[setters(skip)]
    prompt: String,
    #[setters(skip)]
    story: StoryText,
    /// Story segments left after noise filtering
    segments: usize,
    #[setters(skip)]
    images: ImageSet,
    #[setters(strip_option)]
    audio: Option<AudioTrack>,
    #[setters(strip_option)]
    video: Option<VideoArtifact>,
    #[setters(strip_option)]
    metadata: Option<VideoMetadata>,
    #[setters(strip_option)]
    thumbnail: Option<PathBuf>,
    #[setters(strip_option)]
    upload: Option<UploadReceipt>,
}

impl StoryRun {
    /// Start a run record from the generation stage's output.
    ///
    /// Every paragraph counts as a segment until [`Self::with_segments`]
    /// records the noise-filtered count.
    pub fn new(work_dir: PathBuf, prompt: String, story: StoryText, images: ImageSet) -> Self {
        let segments = story.len();
        Self {
            work_dir,
            prompt,
            story,
            segments,
            images,
            audio: None,
            video: None,
            metadata: None,
            thumbnail: None,
            upload: None,
        }
    }

    /// True when the run has at least `min` story segments and `min` images.
    ///
    /// Segments are the noise-filtered count, not the saved paragraphs.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use taleweaver_core::{ImageSet, StoryRun, StoryText};
    ///
    /// let story = StoryText::new((0..6).map(|i| format!("Paragraph {i}")).collect());
    /// let images = ImageSet::from_paths((1..=5).map(|i| PathBuf::from(format!("image_{i:02}.png"))).collect());
    /// let run = StoryRun::new(PathBuf::from("/tmp"), "prompt".into(), story, images);
    /// assert!(!run.is_complete(6));
    /// assert!(run.is_complete(5));
    /// assert!(!run.with_segments(0).is_complete(5));
    /// ```
    pub fn is_complete(&self, min: usize) -> bool {
        self.segments >= min && self.images.len() >= min
    }

    /// Path of the video, if one was produced.
    pub fn video_path(&self) -> Option<&std::path::Path> {
        self.video.as_ref().map(|v| v.path().as_path())
    }

    /// Shareable link of the uploaded video, if published.
    pub fn video_link(&self) -> Option<&str> {
        self.upload.as_ref().and_then(|u| u.video_link().as_deref())
    }
}
