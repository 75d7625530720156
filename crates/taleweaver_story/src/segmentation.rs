//! Heuristic splitting of raw model output into story segments.
//!
//! Models label scenes inconsistently, so several marker styles are tried
//! in a fixed order and the first one that yields at least
//! [`MIN_MARKER_SEGMENTS`] pieces wins. Without usable markers the text is
//! split on blank lines.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Pieces a marker strategy must produce to be accepted.
pub const MIN_MARKER_SEGMENTS: usize = 3;
/// Segments with fewer words are dropped.
pub const MIN_SEGMENT_WORDS: usize = 5;
/// Below this many characters the cleaned story is considered mangled.
pub const MIN_STORY_CHARS: usize = 100;

static SCENE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Segment|SEGMENT|Scene|SCENE)\s+\d+(?:\s*[-:][^a-zA-Z0-9\n]*)?")
        .expect("Valid scene marker regex")
});
static NUMBERED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\n)\s*(?:\d+[\.\)\]]|\[\d+\])\s+").expect("Valid numbered marker regex")
});
static IMAGE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:Image|IMG|Picture|PIC)\s*\d+[^\]]*\]").expect("Valid image label regex")
});
static BRACKET_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("Valid bracket regex"));
static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("Valid blank line regex"));
static HEADING_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*#+\s*|\*\*|__").expect("Valid markup regex"));

/// How a text was split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitStrategy {
    /// `Segment 1:` / `SCENE 2 -` labels
    SceneMarkers,
    /// `1.` / `2)` / `[3]` at line start
    NumberedList,
    /// `[Image 1: ...]` labels
    ImageLabels,
    /// Blank-line paragraphs
    Paragraphs,
}

impl SplitStrategy {
    fn regex(self) -> &'static Regex {
        match self {
            SplitStrategy::SceneMarkers => &*SCENE_MARKER,
            SplitStrategy::NumberedList => &*NUMBERED_MARKER,
            SplitStrategy::ImageLabels => &*IMAGE_LABEL,
            SplitStrategy::Paragraphs => &*BLANK_LINE,
        }
    }
}

/// Marker strategies in priority order.
pub const MARKER_STRATEGIES: [SplitStrategy; 3] = [
    SplitStrategy::SceneMarkers,
    SplitStrategy::NumberedList,
    SplitStrategy::ImageLabels,
];

/// Split `text` with the first strategy that yields enough pieces.
///
/// Returns the strategy used and the raw, trimmed, non-empty pieces.
pub fn split_raw(text: &str) -> (SplitStrategy, Vec<String>) {
    for strategy in MARKER_STRATEGIES {
        let pieces = split_with(strategy, text);
        if pieces.len() >= MIN_MARKER_SEGMENTS {
            debug!(?strategy, pieces = pieces.len(), "Marker strategy accepted");
            return (strategy, pieces);
        }
    }
    debug!("No marker strategy matched; splitting on blank lines");
    (SplitStrategy::Paragraphs, split_paragraphs(text))
}

fn split_with(strategy: SplitStrategy, text: &str) -> Vec<String> {
    strategy
        .regex()
        .split(text)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split on blank lines, dropping empty paragraphs.
///
/// # Examples
///
/// ```
/// use taleweaver_story::split_paragraphs;
///
/// assert_eq!(split_paragraphs("a\n\n  \n b \n\nc"), vec!["a", "b", "c"]);
/// ```
pub fn split_paragraphs(text: &str) -> Vec<String> {
    split_with(SplitStrategy::Paragraphs, text)
}

/// True for pieces that are not story prose.
fn is_noise(segment: &str) -> bool {
    segment.split_whitespace().count() < MIN_SEGMENT_WORDS
        || segment.starts_with("Image generation:")
        || segment.starts_with("Note:")
        || segment.to_lowercase().contains("end of story")
        || segment.contains("```")
}

/// Strip labels and markup from one kept segment.
fn clean_segment(segment: &str, strategy: SplitStrategy) -> String {
    let text = IMAGE_LABEL.replace_all(segment, "");
    let text = BRACKET_NOTE.replace_all(&text, "");
    let text = HEADING_MARKUP.replace_all(&text, "").replace("```", "");
    let text = text.trim();
    if strategy == SplitStrategy::SceneMarkers {
        return drop_title_line(text).to_string();
    }
    text.to_string()
}

/// Lowercase words allowed inside a title-cased line.
const TITLE_JOINERS: [&str; 12] = [
    "a", "an", "and", "at", "by", "for", "in", "of", "on", "or", "the", "to",
];

/// True when every word of `line` starts upper-case, apart from short
/// joiners after the first word.
fn is_title_case(line: &str) -> bool {
    line.split_whitespace().enumerate().all(|(i, word)| {
        match word.chars().find(|c| c.is_alphabetic()) {
            Some(first) => first.is_uppercase() || (i > 0 && TITLE_JOINERS.contains(&word)),
            None => true,
        }
    })
}

/// Drop a short title line such as `The Big Meadow` left after a scene label.
///
/// The line must be title-cased or followed by a blank line, so hard-wrapped
/// prose is kept.
fn drop_title_line(text: &str) -> &str {
    let Some((first, rest)) = text.split_once('\n') else {
        return text;
    };
    let first = first.trim();
    let short = first.split_whitespace().count() < 8 && !first.ends_with(['.', '!', '?', '"', '\'']);
    let set_apart = rest.lines().next().is_some_and(|line| line.trim().is_empty());
    if short && (set_apart || is_title_case(first)) && !rest.trim().is_empty() {
        rest.trim()
    } else {
        text
    }
}

/// Ordered, cleaned story segments.
///
/// # Examples
///
/// ```
/// use taleweaver_story::collect_story_segments;
///
/// let raw = "Segment 1: Pip wakes up in the warm red barn.\n\
///            Segment 2: Pip follows a butterfly across the meadow.\n\
///            Segment 3: Pip finds her way home before sunset.";
/// let segments = collect_story_segments(raw);
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[0], "Pip wakes up in the warm red barn.");
/// ```
pub fn collect_story_segments(raw: &str) -> Vec<String> {
    let (strategy, pieces) = split_raw(raw.trim());
    let segments: Vec<String> = pieces
        .iter()
        .filter(|piece| !is_noise(piece))
        .map(|piece| clean_segment(piece, strategy))
        .filter(|segment| !segment.is_empty())
        .collect();
    info!(
        ?strategy,
        pieces = pieces.len(),
        segments = segments.len(),
        "Extracted story segments"
    );
    segments
}

/// Cleaned story as one text, segments separated by blank lines.
///
/// If cleaning leaves fewer than [`MIN_STORY_CHARS`] characters of a longer
/// input, the trimmed input is returned instead.
pub fn collect_complete_story(raw: &str) -> String {
    let original = raw.trim();
    let story = collect_story_segments(original).join("\n\n");
    if story.chars().count() < MIN_STORY_CHARS && original.chars().count() > MIN_STORY_CHARS {
        warn!(
            cleaned_chars = story.chars().count(),
            "Cleaned story is too short; keeping the original text"
        );
        return original.to_string();
    }
    story
}
