//! Extension-based media classification

use super::MediaKind;
use std::sync::OnceLock;

/// Classifier used by [`classify`]
static DEFAULT_CLASSIFIER: OnceLock<MediaClassifier> = OnceLock::new();

/// Maps filenames to a [`MediaKind`] by extension
///
/// Matching is a case-insensitive suffix check on the text after the last
/// dot, so `".jpg"` on its own is an image and `"jpg"` is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaClassifier {
    image_extensions: Vec<String>,
    video_extensions: Vec<String>,
}

impl Default for MediaClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_IMAGE_EXTENSIONS, Self::DEFAULT_VIDEO_EXTENSIONS)
    }
}

impl MediaClassifier {
    pub const DEFAULT_IMAGE_EXTENSIONS: &'static [&'static str] =
        &["jpg", "jpeg", "png", "webp", "gif"];

    pub const DEFAULT_VIDEO_EXTENSIONS: &'static [&'static str] = &["mp4", "mov", "m4v"];

    /// Create a classifier from extension lists
    ///
    /// Entries are normalized to lowercase without a leading dot. An
    /// extension listed as both image and video classifies as image.
    pub fn new<S: AsRef<str>>(image_extensions: &[S], video_extensions: &[S]) -> Self {
        Self {
            image_extensions: normalize(image_extensions),
            video_extensions: normalize(video_extensions),
        }
    }

    /// Classify a filename. Total: every input maps to exactly one kind.
    pub fn classify(&self, filename: &str) -> MediaKind {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return MediaKind::Unknown;
        };

        if self.image_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            MediaKind::Image
        } else if self.video_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            MediaKind::Video
        } else {
            MediaKind::Unknown
        }
    }

    pub fn image_extensions(&self) -> &[String] {
        &self.image_extensions
    }

    pub fn video_extensions(&self) -> &[String] {
        &self.video_extensions
    }
}

fn normalize<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Classify with the built-in extension lists
pub fn classify(filename: &str) -> MediaKind {
    DEFAULT_CLASSIFIER
        .get_or_init(MediaClassifier::default)
        .classify(filename)
}

/// Whether a kind belongs in any listing
pub fn is_media(kind: MediaKind) -> bool {
    kind != MediaKind::Unknown
}
