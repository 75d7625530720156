//! Text stages of the Taleweaver pipeline.
//!
//! - [`PromptGenerator`] rewrites a request into the scene prompt template
//! - [`StoryGenerator`] produces story text with inline illustrations
//! - [`collect_story_segments`] and friends clean raw model output
//! - [`SeoGenerator`] writes publishing metadata, falling back to
//!   [`default_metadata`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extraction;
mod generator;
mod prompt;
mod request;
mod segmentation;
mod seo;

pub use extraction::{extract_json, parse_json, strip_code_fences};
pub use generator::{GeneratedStory, SAFETY_SOFTENING, STORY_FILE, StoryGenerator, save_images};
pub use prompt::{
    PROMPT_INSTRUCTIONS, PROMPT_OPENING, PromptGenerator, STYLE_PHRASE, WIDESCREEN_SENTENCE,
    repair_prompt,
};
pub use segmentation::{
    MARKER_STRATEGIES, MIN_MARKER_SEGMENTS, MIN_SEGMENT_WORDS, MIN_STORY_CHARS, SplitStrategy,
    collect_complete_story, collect_story_segments, split_paragraphs, split_raw,
};
pub use seo::{
    STORY_PREVIEW_CHARS, SeoGenerator, character_and_setting, default_metadata,
    default_metadata_on, parse_metadata_reply, story_preview,
};
