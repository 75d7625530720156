//! Story text and illustration set.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ordered story paragraphs.
///
/// # Examples
///
/// ```
/// use taleweaver_core::StoryText;
///
/// let story = StoryText::from_text("Pip woke early.\n\n  \nPip ran to the barn.\n");
/// assert_eq!(story.len(), 2);
/// assert_eq!(story.as_text(), "Pip woke early.\n\nPip ran to the barn.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, derive_getters::Getters)]
pub struct StoryText {
    paragraphs: Vec<String>,
}

impl StoryText {
    /// Wrap already segmented paragraphs, dropping blank ones.
    pub fn new(paragraphs: Vec<String>) -> Self {
        Self {
            paragraphs: paragraphs
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Split text on blank lines (lines holding only whitespace count as blank).
    pub fn from_text(text: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join("\n"));
        }
        Self::new(paragraphs)
    }

    /// Paragraphs joined with blank lines.
    pub fn as_text(&self) -> String {
        self.paragraphs.join("\n\n")
    }

    /// Number of paragraphs.
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// True when there are no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// Illustration files ordered by generation sequence number.
///
/// Sequence numbers are read from file names of the form `image_NN.ext`;
/// files without one sort after numbered files, by name.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use taleweaver_core::ImageSet;
///
/// let set = ImageSet::from_paths(vec![
///     PathBuf::from("/tmp/run/image_10.png"),
///     PathBuf::from("/tmp/run/image_02.png"),
///     PathBuf::from("/tmp/run/image_01.jpg"),
/// ]);
/// let names: Vec<_> = set.paths().iter()
///     .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
///     .collect();
/// assert_eq!(names, ["image_01.jpg", "image_02.png", "image_10.png"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, derive_getters::Getters)]
pub struct ImageSet {
    paths: Vec<PathBuf>,
}

impl ImageSet {
    /// Sort paths by embedded sequence number.
    pub fn from_paths(mut paths: Vec<PathBuf>) -> Self {
        paths.sort_by(|a, b| {
            let key_a = (sequence_number(a).unwrap_or(u32::MAX), a.file_name());
            let key_b = (sequence_number(b).unwrap_or(u32::MAX), b.file_name());
            key_a.cmp(&key_b)
        });
        Self { paths }
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True when there are no images.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// First image, if any.
    pub fn first(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    /// Frame used for the thumbnail: the second image when there are
    /// several, otherwise the only one.
    pub fn thumbnail_source(&self) -> Option<&Path> {
        let index = 1.min(self.paths.len().checked_sub(1)?);
        self.paths.get(index).map(PathBuf::as_path)
    }
}

/// Sequence number embedded in an `image_NN` file stem.
pub fn sequence_number(path: &Path) -> Option<u32> {
    path.file_stem()?
        .to_str()?
        .strip_prefix("image_")?
        .parse()
        .ok()
}

/// File name for the `index`-th generated image.
///
/// # Examples
///
/// ```
/// use taleweaver_core::image_file_name;
///
/// assert_eq!(image_file_name(3, "image/png"), "image_03.png");
/// assert_eq!(image_file_name(12, "image/jpeg"), "image_12.jpg");
/// ```
pub fn image_file_name(index: usize, mime: &str) -> String {
    let ext = match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    };
    format!("image_{index:02}.{ext}")
}
