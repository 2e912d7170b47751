//! Display paths for library files

use std::path::{Path, PathBuf};

/// Joins media names onto the library directory
///
/// Paths are never stored on items; they are recomputed from the name and
/// the current base directory every time a view needs one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaResolver {
    base_dir: Option<PathBuf>,
}

impl MediaResolver {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Path of `name` inside the base directory, or the bare name when no
    /// base directory is configured
    pub fn resolve(&self, name: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    /// `file://` URI for viewers that want one
    pub fn uri(&self, name: &str) -> String {
        format!("file://{}", self.resolve(name).display())
    }
}
