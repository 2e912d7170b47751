//! Configuration types for the media shelf

use crate::media::MediaClassifier;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the favorites blob when no explicit path is configured
pub const DEFAULT_FAVORITES_FILE: &str = ".favorites.json";

/// Ordering policy for the gallery listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderPolicy {
    /// Keep the order the directory listing reports
    Listing,
    /// Ascending by the timestamp-like number embedded in the filename,
    /// ties broken by filename
    #[default]
    Timestamp,
}

/// Configuration for the media shelf
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding captured media (flat, no subdirectories)
    #[serde(default)]
    pub library_dir: Option<PathBuf>,

    /// Favorites file path (defaults to `.favorites.json` in the library directory)
    #[serde(default)]
    pub favorites_file: Option<PathBuf>,

    /// Gallery ordering policy
    #[serde(default)]
    pub order: OrderPolicy,

    /// Default destination for `export`
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Extensions classified as images (lowercase, no dot)
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Extensions classified as videos (lowercase, no dot)
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

fn default_image_extensions() -> Vec<String> {
    MediaClassifier::DEFAULT_IMAGE_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

fn default_video_extensions() -> Vec<String> {
    MediaClassifier::DEFAULT_VIDEO_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_dir: None,
            favorites_file: None,
            order: OrderPolicy::default(),
            export_dir: None,
            verbose: false,
            image_extensions: default_image_extensions(),
            video_extensions: default_video_extensions(),
        }
    }
}

impl Config {
    /// Build the classifier described by the extension lists
    pub fn classifier(&self) -> MediaClassifier {
        MediaClassifier::new(&self.image_extensions, &self.video_extensions)
    }

    /// Get favorites file path, using default if not specified
    ///
    /// Returns `None` only when neither a favorites file nor a library
    /// directory is configured.
    pub fn get_favorites_file(&self) -> Option<PathBuf> {
        self.favorites_file.clone().or_else(|| {
            self.library_dir
                .as_ref()
                .map(|dir| dir.join(DEFAULT_FAVORITES_FILE))
        })
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            source: e,
        })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Media Shelf Configuration File
# This file uses TOML format (https://toml.io)

# Directory holding captured photos and videos
library_dir = "/home/me/Pictures/Captured"

# Where favorites are persisted (JSON array of filenames)
# Defaults to <library_dir>/.favorites.json
# favorites_file = "/home/me/.config/media-shelf/favorites.json"

# Gallery ordering: "listing" or "timestamp"
# - listing: the order the directory listing reports (by filename)
# - timestamp: by the number embedded in the filename, e.g. IMG_20240102_030405.jpg
order = "timestamp"

# Default destination for `export`
# export_dir = "/home/me/Pictures/Saved"

# Verbose output
verbose = false

# Recognized extensions (lowercase, no dot)
image_extensions = ["jpg", "jpeg", "png", "webp", "gif"]
video_extensions = ["mp4", "mov", "m4v"]
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError {
        source: toml::ser::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
