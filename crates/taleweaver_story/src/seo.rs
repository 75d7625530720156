//! Title, description and tags for publishing.

use crate::extraction::{extract_json, parse_json};
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;
use taleweaver_config::GenerationConfig;
use taleweaver_core::{GenerateRequest, Input, Message, Role, VideoMetadata, truncate_chars};
use taleweaver_error::{StoryError, StoryErrorKind, TaleweaverResult};
use taleweaver_interface::ContentDriver;
use tracing::{debug, info, instrument, warn};

/// Characters of story text sent to the model and used in descriptions.
pub const STORY_PREVIEW_CHARS: usize = 500;

const DEFAULT_CHARACTER: &str = "an animal";
const DEFAULT_SETTING: &str = "an adventure";

static CHARACTER_SETTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"about\s+(.*?)\s+going\s+on\s+an\s+adventure\s+in\s+(.*?)(?:\s+in\s+a\s+(?:highly\s+detailed\s+)?3d|\.)",
    )
    .expect("Valid character/setting regex")
});

/// Story start for prompts and descriptions, with `...` when cut.
pub fn story_preview(story: &str) -> String {
    if story.chars().count() > STORY_PREVIEW_CHARS {
        format!("{}...", truncate_chars(story, STORY_PREVIEW_CHARS))
    } else {
        story.to_string()
    }
}

/// Character and setting named in a prompt, with generic fallbacks.
///
/// # Examples
///
/// ```
/// use taleweaver_story::character_and_setting;
///
/// let (character, setting) = character_and_setting(
///     "Generate a story about a white baby goat named Pip going on an adventure in a farm in a highly detailed 3d cartoon animation style.",
/// );
/// assert_eq!(character, "a white baby goat named Pip");
/// assert_eq!(setting, "a farm");
///
/// assert_eq!(character_and_setting("Anything"), ("an animal".to_string(), "an adventure".to_string()));
/// ```
pub fn character_and_setting(prompt: &str) -> (String, String) {
    CHARACTER_SETTING
        .captures(prompt)
        .map(|caps| (caps[1].trim().to_string(), caps[2].trim().to_string()))
        .filter(|(c, s)| !c.is_empty() && !s.is_empty())
        .unwrap_or_else(|| (DEFAULT_CHARACTER.to_string(), DEFAULT_SETTING.to_string()))
}

/// Metadata built without a model, dated today.
pub fn default_metadata(story: &str, prompt: &str) -> VideoMetadata {
    default_metadata_on(story, prompt, chrono::Local::now().date_naive())
}

/// Metadata built without a model, dated `created`.
pub fn default_metadata_on(story: &str, prompt: &str, created: NaiveDate) -> VideoMetadata {
    let (character, setting) = character_and_setting(prompt);
    let title = format!("Adventure of {} in {} | Children's Story", character, setting);
    let description = format!(
        "Join {character} on an exciting adventure in {setting}!\n\n\
         {preview}\n\n\
         This animated children's story is perfect for bedtime reading, family story time, \
         or whenever your child wants to explore magical worlds and learn valuable lessons. \
         Watch as our character overcomes challenges and discovers new friends along the way.\n\n\
         #ChildrensStory #Animation #KidsEntertainment\n\n\
         Created: {date}",
        preview = story_preview(story),
        date = created.format("%Y-%m-%d"),
    );
    let tags = [
        "children's story",
        "kids animation",
        "bedtime story",
        "animated story",
        character.as_str(),
        setting.as_str(),
        "family friendly",
        "kids entertainment",
        "story time",
        "animated adventure",
        "educational content",
        "preschool",
        "moral story",
        "3D animation",
        "storybook",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    VideoMetadata::new(title, description, tags)
}

/// Metadata object the model is asked for.
#[derive(Debug, Deserialize)]
struct MetadataReply {
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
}

impl MetadataReply {
    fn into_metadata(self) -> Option<VideoMetadata> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let description = self.description?;
        let tags: Vec<String> = self
            .tags?
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            return None;
        }
        Some(VideoMetadata::new(title, description, tags))
    }
}

/// Parse a model reply into metadata.
///
/// # Errors
///
/// Fails when the reply holds no JSON object, the JSON is invalid, or a
/// field is missing or empty.
pub fn parse_metadata_reply(reply: &str) -> TaleweaverResult<VideoMetadata> {
    let json = extract_json(reply)?;
    let parsed: MetadataReply = parse_json(&json)?;
    parsed.into_metadata().ok_or_else(|| {
        StoryError::new(StoryErrorKind::Parse(
            "metadata is missing title, description or tags".to_string(),
        ))
        .into()
    })
}

fn metadata_prompt(story: &str, prompt: &str) -> String {
    format!(
        "Based on this children's story and its first image, create SEO-optimized metadata for a YouTube video.\n\n\
         STORY PREVIEW:\n{preview}\n\n\
         PROMPT USED:\n{prompt}\n\n\
         Return ONLY a JSON object with:\n\
         1. 'title': A catchy, SEO-friendly title (max 60 chars)\n\
         2. 'description': Engaging description (300-500 chars) with relevant keywords\n\
         3. 'tags': List of 10-15 relevant tags as strings\n\n\
         Format your response as valid JSON without explanation:\n\
         {{\n  \"title\": \"Your Title Here\",\n  \"description\": \"Your description here...\",\n  \"tags\": [\"tag1\", \"tag2\", \"tag3\"]\n}}",
        preview = story_preview(story),
    )
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Asks a text model for publishing metadata.
pub struct SeoGenerator<D: ContentDriver> {
    driver: D,
    generation: GenerationConfig,
}

impl<D: ContentDriver> SeoGenerator<D> {
    /// Create a generator calling `driver`.
    pub fn new(driver: D, generation: GenerationConfig) -> Self {
        Self { driver, generation }
    }

    /// Request built from the story, prompt and optional first image.
    pub async fn build_request(
        &self,
        story: &str,
        prompt: &str,
        first_image: Option<&Path>,
    ) -> GenerateRequest {
        let mut content = vec![Input::Text(metadata_prompt(story, prompt))];
        if let Some(path) = first_image {
            match tokio::fs::read(path).await {
                Ok(data) => {
                    debug!(path = %path.display(), "Attaching first image");
                    content.push(Input::Image {
                        mime: image_mime(path).to_string(),
                        data,
                    });
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Could not read image for metadata"),
            }
        }
        GenerateRequest {
            messages: vec![Message {
                role: Role::User,
                content,
            }],
            temperature: Some(self.generation.seo_temperature),
            top_p: Some(self.generation.top_p),
            top_k: Some(self.generation.top_k),
            max_tokens: Some(self.generation.seo_max_output_tokens),
            ..Default::default()
        }
    }

    /// Model metadata, or [`default_metadata`] on any failure.
    #[instrument(skip_all)]
    pub async fn generate(
        &self,
        story: &str,
        prompt: &str,
        first_image: Option<&Path>,
    ) -> VideoMetadata {
        let req = self.build_request(story, prompt, first_image).await;
        let result = match self.driver.generate(&req).await {
            Ok(response) => parse_metadata_reply(&response.text()),
            Err(e) => Err(e),
        };
        match result {
            Ok(metadata) => {
                info!(title = %metadata.title, tags = metadata.tags.len(), "Generated metadata");
                metadata
            }
            Err(e) => {
                warn!(error = %e, "Metadata generation failed; using defaults");
                default_metadata(story, prompt)
            }
        }
    }
}
