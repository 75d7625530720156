//! Story text and illustration generation.

use crate::prompt::preview;
use crate::request::{creative_request, send};
use crate::segmentation::{collect_complete_story, collect_story_segments};
use std::path::{Path, PathBuf};
use taleweaver_config::GenerationConfig;
use taleweaver_core::{
    GenerateResponse, ImageSet, Message, Modality, StoryText, image_file_name,
};
use taleweaver_error::{MediaError, StoryError, StoryErrorKind, TaleweaverResult};
use taleweaver_interface::Streaming;
use taleweaver_retry::{Attempt, RetryPolicy, retry_with_backoff};
use tracing::{debug, info, instrument, warn};

/// File the cleaned story is written to inside the work directory.
pub const STORY_FILE: &str = "story.txt";

/// Appended to the prompt after a safety block.
pub const SAFETY_SOFTENING: &str =
    "Keep every scene gentle, friendly and suitable for very young children.";

/// Output of the story stage.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct GeneratedStory {
    /// Model output before segmentation
    raw_text: String,
    /// Cleaned story paragraphs
    story: StoryText,
    /// Story segments found in the cleaned text after noise filtering
    segments: usize,
    /// Saved illustrations in sequence order
    images: ImageSet,
    /// Where the cleaned story was written
    story_path: PathBuf,
}

/// Generates a story with inline illustrations.
pub struct StoryGenerator<D: Streaming> {
    driver: D,
    generation: GenerationConfig,
    policy: RetryPolicy,
}

impl<D: Streaming> StoryGenerator<D> {
    /// Create a generator calling `driver` with the given settings.
    pub fn new(driver: D, generation: GenerationConfig, policy: RetryPolicy) -> Self {
        Self {
            driver,
            generation,
            policy,
        }
    }

    /// One model call for `prompt`.
    async fn attempt(
        &self,
        prompt: &str,
        attempt: Attempt,
        stream: bool,
    ) -> TaleweaverResult<GenerateResponse> {
        let text = if attempt.safety_retry {
            format!("{} {}", prompt, SAFETY_SOFTENING)
        } else {
            prompt.to_string()
        };
        let req = creative_request(
            &self.generation,
            vec![Message::user(text)],
            vec![Modality::Text, Modality::Image],
        );
        debug!(attempt = attempt.number, stream, "Requesting story content");
        send(&self.driver, &req, stream).await
    }

    /// Retried call in one mode; `None` when the budget runs out.
    async fn retried(&self, prompt: &str, stream: bool) -> Option<GenerateResponse> {
        let label = if stream {
            "streaming story generation"
        } else {
            "story generation"
        };
        retry_with_backoff(&self.policy, label, |attempt| {
            self.attempt(prompt, attempt, stream)
        })
        .await
        .ok()
    }

    /// Model response carrying both text and images, trying streaming first
    /// when enabled.
    pub async fn request_content(&self, prompt: &str) -> TaleweaverResult<GenerateResponse> {
        let mut response = None;
        if self.generation.stream {
            response = self.retried(prompt, true).await;
            if !response.as_ref().is_some_and(has_text_and_images) {
                warn!("Streaming generation returned no usable content; trying non-streaming");
                response = None;
            }
        }
        if response.is_none() {
            response = self.retried(prompt, false).await;
        }

        let response = response.unwrap_or_default();
        if response.text().trim().is_empty() {
            return Err(StoryError::new(StoryErrorKind::EmptyText).into());
        }
        if response.images().next().is_none() {
            return Err(StoryError::new(StoryErrorKind::NoImages).into());
        }
        Ok(response)
    }

    /// Generate the story for `prompt`, saving images and `story.txt` into
    /// `work_dir`.
    #[instrument(skip_all, fields(work_dir = %work_dir.display()))]
    pub async fn generate(&self, prompt: &str, work_dir: &Path) -> TaleweaverResult<GeneratedStory> {
        info!(prompt = %preview(prompt), "Requesting story content");
        let response = self.request_content(prompt).await?;
        let images = save_images(&response, work_dir).await?;

        let raw_text = response.text();
        let cleaned = collect_complete_story(&raw_text);
        let story = StoryText::from_text(&cleaned);
        let segments = collect_story_segments(&cleaned).len();
        if story.is_empty() {
            return Err(StoryError::new(StoryErrorKind::EmptyText).into());
        }

        let story_path = work_dir.join(STORY_FILE);
        tokio::fs::write(&story_path, story.as_text())
            .await
            .map_err(|e| MediaError::io(&story_path, e))?;
        info!(
            paragraphs = story.len(),
            segments,
            images = images.len(),
            path = %story_path.display(),
            "Saved story"
        );

        Ok(GeneratedStory {
            raw_text,
            story,
            segments,
            images,
            story_path,
        })
    }
}

fn has_text_and_images(response: &GenerateResponse) -> bool {
    !response.text().trim().is_empty() && response.images().next().is_some()
}

/// Write every inline image as `image_NN.<ext>`, numbered from 1.
///
/// Images that fail to save are skipped with a warning.
pub async fn save_images(response: &GenerateResponse, work_dir: &Path) -> TaleweaverResult<ImageSet> {
    let mut paths = Vec::new();
    for (index, (mime, data)) in response.images().enumerate() {
        let path = work_dir.join(image_file_name(index + 1, mime));
        match tokio::fs::write(&path, data).await {
            Ok(()) => {
                debug!(path = %path.display(), bytes = data.len(), "Saved image");
                paths.push(path);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to save image"),
        }
    }
    if paths.is_empty() {
        return Err(StoryError::new(StoryErrorKind::NoImages).into());
    }
    Ok(ImageSet::from_paths(paths))
}
