//! Media classification module
//!
//! Everything here is a pure function of a filename:
//! - media kind from the (case-insensitive) extension
//! - a best-effort order key from an embedded timestamp-like digit run
//! - the display path of a file inside the library directory

pub mod classify;
pub mod order_key;
pub mod resolve;

pub use classify::{MediaClassifier, classify, is_media};
pub use order_key::extract_order_key;
pub use resolve::MediaResolver;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of a library file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A file in the library as seen by the gallery
///
/// `kind` and `order_key` are derived from `name` when the item is built and
/// cannot be changed independently. A rename produces a new item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    name: String,
    kind: MediaKind,
    order_key: u64,
}

impl MediaItem {
    /// Build an item, deriving its kind with `classifier`
    pub fn new(name: impl Into<String>, classifier: &MediaClassifier) -> Self {
        let name = name.into();
        let kind = classifier.classify(&name);
        let order_key = extract_order_key(&name);
        Self {
            name,
            kind,
            order_key,
        }
    }

    /// Filename as stored in the library directory
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Sort hint extracted from the filename; `0` when none was found
    pub fn order_key(&self) -> u64 {
        self.order_key
    }

    pub fn is_media(&self) -> bool {
        is_media(self.kind)
    }
}
