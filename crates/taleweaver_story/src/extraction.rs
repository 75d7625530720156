//! Pulling JSON out of model replies.
//!
//! Replies often wrap JSON in markdown fences or surround it with prose.

use serde::de::DeserializeOwned;
use taleweaver_error::{StoryError, StoryErrorKind, TaleweaverResult};

/// Extract a JSON object from a reply that may contain markdown or prose.
///
/// Tries a fenced ```` ```json ```` block first, then the first balanced
/// `{ ... }` in the text.
///
/// # Errors
///
/// Returns [`StoryErrorKind::NoJson`] when neither strategy finds an object.
///
/// # Examples
///
/// ```
/// use taleweaver_story::extract_json;
///
/// let reply = "Here you go:\n```json\n{\"title\": \"Pip\"}\n```\nEnjoy!";
/// assert_eq!(extract_json(reply).unwrap(), "{\"title\": \"Pip\"}");
/// ```
pub fn extract_json(response: &str) -> TaleweaverResult<String> {
    if let Some(block) = extract_from_code_block(response, "json") {
        if let Some(json) = extract_balanced(&block, '{', '}') {
            return Ok(json);
        }
    }

    if let Some(json) = extract_balanced(response, '{', '}') {
        return Ok(json);
    }

    tracing::warn!(
        response_length = response.len(),
        "No JSON object found in model reply"
    );
    Err(StoryError::new(StoryErrorKind::NoJson(format!(
        "{} characters of text without a JSON object",
        response.len()
    )))
    .into())
}

/// Content of the first fenced code block.
///
/// Prefers a block tagged with `language`; an unterminated fence runs to the
/// end of the text.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        let content = match response[content_start..].find("```") {
            Some(end) => &response[content_start..content_start + end],
            None => &response[content_start..],
        };
        return Some(content.trim().to_string());
    }

    let start = response.find("```")?;
    let content_start = start + 3;
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);
    let content = match response[skip_to..].find("```") {
        Some(end) => &response[skip_to..skip_to + end],
        None => &response[skip_to..],
    };
    Some(content.trim().to_string())
}

/// Text between the first `open` and its matching `close`.
///
/// Delimiters inside JSON strings are ignored.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Remove markdown code fence lines, keeping their content.
///
/// # Examples
///
/// ```
/// use taleweaver_story::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```text\nHello\n```"), "Hello");
/// ```
pub fn strip_code_fences(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse JSON into `T`, logging a preview of the input on failure.
///
/// # Errors
///
/// Returns [`StoryErrorKind::Parse`] if the text is not valid JSON for `T`.
pub fn parse_json<T>(json_str: &str) -> TaleweaverResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(json_str).map_err(|e| {
        let preview = json_str.chars().take(100).collect::<String>();
        tracing::warn!(error = %e, json_preview = %preview, "JSON parsing failed");
        StoryError::new(StoryErrorKind::Parse(format!("{} (JSON: {}...)", e, preview))).into()
    })
}
