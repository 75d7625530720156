//! Scene prompt generation.
//!
//! The prompt model rewrites a loose request into the fixed template the
//! story model responds to best, and the reply is repaired so the template's
//! required phrases are always present.

use crate::request::{creative_request, send};
use crate::strip_code_fences;
use regex::Regex;
use std::sync::LazyLock;
use taleweaver_config::GenerationConfig;
use taleweaver_core::Message;
use taleweaver_error::{StoryError, StoryErrorKind, TaleweaverResult};
use taleweaver_interface::Streaming;
use taleweaver_retry::{RetryPolicy, retry_with_backoff};
use tracing::{info, instrument, warn};

/// Opening phrase of every prompt.
pub const PROMPT_OPENING: &str = "Generate a story about";
/// Art style phrase every prompt must carry.
pub const STYLE_PHRASE: &str = "highly detailed 3d cartoon animation style";
/// Aspect ratio sentence every prompt must carry.
pub const WIDESCREEN_SENTENCE: &str =
    "Generate images in 16:9 aspect ratio suitable for a widescreen YouTube video.";

/// Instructions sent as the system message.
pub const PROMPT_INSTRUCTIONS: &str = "\
As a creative writing expert for children's stories, your task is to generate a detailed story prompt for our creative AI.

Please structure your response in this specific format:
```
Generate a story about [CHARACTER] going on an adventure in [SETTING] in a highly detailed 3d cartoon animation style. Make sure each scene has maximum detail, vibrant colors, and professional lighting. The story should be positive, uplifting, and perfect for a YouTube children's channel. Generate images in 16:9 aspect ratio suitable for a widescreen YouTube video.
```

IMPORTANT RULES:
1. Always include \"in a highly detailed 3d cartoon animation style\" in the prompt
2. Always include \"Generate images in 16:9 aspect ratio suitable for a widescreen YouTube video\"
3. Make the character and setting family-friendly, colorful and appealing to young children
4. Your response should ONLY contain the prompt text in the format above, without any additional explanations or text
5. Create a unique character and fantasy setting each time
6. No RPG/video game settings or popular cartoon characters
7. Include specific visual style details like \"vibrant colors\" and \"professional lighting\"";

static TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Generate a story about (.*?) going on an adventure in (.*?) in a highly detailed 3d cartoon animation style",
    )
    .expect("Valid prompt template regex")
});

/// Bring a model reply into the prompt template.
///
/// A reply matching the template is cut to start at [`PROMPT_OPENING`];
/// anything else has its code fences removed and the missing required
/// phrases added.
///
/// # Examples
///
/// ```
/// use taleweaver_story::repair_prompt;
///
/// let repaired = repair_prompt("a brave snail");
/// assert!(repaired.starts_with("Generate a story about a brave snail"));
/// assert!(repaired.contains("highly detailed 3d cartoon animation style"));
/// assert!(repaired.contains("16:9"));
/// ```
pub fn repair_prompt(reply: &str) -> String {
    let reply = strip_code_fences(reply);

    if TEMPLATE.is_match(&reply) {
        if let Some(start) = reply.find(PROMPT_OPENING) {
            let mut prompt = reply[start..].trim().to_string();
            if !prompt.contains("16:9") {
                prompt.push(' ');
                prompt.push_str(WIDESCREEN_SENTENCE);
            }
            return prompt;
        }
    }

    let mut prompt = reply;
    if !prompt.contains(PROMPT_OPENING) {
        prompt = format!("{} {}", PROMPT_OPENING, prompt);
    }
    if !prompt.contains(STYLE_PHRASE) {
        prompt.push_str(" in a ");
        prompt.push_str(STYLE_PHRASE);
    }
    if !prompt.contains("16:9") {
        prompt.push(' ');
        prompt.push_str(WIDESCREEN_SENTENCE);
    }
    prompt
}

/// Rewrites user input into a scene prompt.
pub struct PromptGenerator<D: Streaming> {
    driver: D,
    generation: GenerationConfig,
    policy: RetryPolicy,
}

impl<D: Streaming> PromptGenerator<D> {
    /// Create a generator calling `driver` with the given settings.
    pub fn new(driver: D, generation: GenerationConfig, policy: RetryPolicy) -> Self {
        Self {
            driver,
            generation,
            policy,
        }
    }

    /// One model call plus repair, without retries.
    #[instrument(skip_all)]
    pub async fn generate_once(&self, input: &str) -> TaleweaverResult<String> {
        let mut messages = vec![Message::system(PROMPT_INSTRUCTIONS)];
        if !input.trim().is_empty() {
            messages.push(Message::user(format!("User request: {}", input.trim())));
        }
        let req = creative_request(&self.generation, messages, Vec::new());
        let reply = send(&self.driver, &req, self.generation.stream).await?.text();
        if reply.trim().is_empty() {
            return Err(StoryError::new(StoryErrorKind::EmptyText).into());
        }
        Ok(repair_prompt(&reply))
    }

    /// Generate a prompt with retries.
    ///
    /// Returns `None` once the retry budget is spent; callers fall back to
    /// the input prompt.
    pub async fn generate(&self, input: &str) -> Option<String> {
        let result = retry_with_backoff(&self.policy, "prompt generation", |_| {
            self.generate_once(input)
        })
        .await;
        match result {
            Ok(prompt) => {
                info!(preview = %preview(&prompt), "Generated story prompt");
                Some(prompt)
            }
            Err(e) => {
                warn!(error = %e, "Prompt generation failed");
                None
            }
        }
    }

    /// Generated prompt, or `input` when generation fails.
    pub async fn generate_or_fallback(&self, input: &str) -> String {
        match self.generate(input).await {
            Some(prompt) => prompt,
            None => {
                warn!(preview = %preview(input), "Using the input prompt unchanged");
                input.to_string()
            }
        }
    }
}

/// First 50 characters, for log lines.
pub(crate) fn preview(text: &str) -> String {
    taleweaver_core::truncate_chars(text, 50)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_match_keeps_text_from_opening() {
        let reply = "Sure! Here it is:\nGenerate a story about a tiny fox going on an adventure in a candy forest in a highly detailed 3d cartoon animation style. Vibrant colors.";
        let repaired = repair_prompt(reply);
        assert!(repaired.starts_with("Generate a story about a tiny fox"));
        assert!(repaired.ends_with(WIDESCREEN_SENTENCE));
    }

    #[test]
    fn test_template_match_with_ratio_untouched() {
        let reply = format!(
            "```\nGenerate a story about a owl going on an adventure in a cloud city in a highly detailed 3d cartoon animation style. {}\n```",
            WIDESCREEN_SENTENCE
        );
        let repaired = repair_prompt(&reply);
        assert_eq!(repaired.matches("16:9").count(), 1);
        assert!(!repaired.contains("```"));
    }

    #[test]
    fn test_missing_phrases_added_once() {
        let repaired = repair_prompt("```\na curious turtle\n```");
        assert_eq!(
            repaired,
            format!(
                "Generate a story about a curious turtle in a highly detailed 3d cartoon animation style {}",
                WIDESCREEN_SENTENCE
            )
        );
        assert_eq!(repair_prompt(&repaired), repaired);
    }
}
