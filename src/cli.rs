//! CLI argument parsing with clap

use crate::config::{Config, OrderPolicy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Media Shelf - browse captured photos and videos and keep favorites
///
/// Lists the media in a flat library directory, keeps a favorites list
/// consistent with what is actually on disk, and imports, exports and
/// deletes individual items.
#[derive(Parser, Debug)]
#[command(name = "media-shelf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Library directory holding captured media
    #[arg(short, long, env = "MEDIA_SHELF_DIR", global = true)]
    pub library: Option<PathBuf>,

    /// Favorites file (JSON array of filenames)
    #[arg(short, long, global = true)]
    pub favorites: Option<PathBuf>,

    /// Gallery ordering policy
    #[arg(short, long, value_enum, global = true)]
    pub order: Option<OrderPolicy>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the gallery
    List,
    /// List favorites that still exist in the library
    Favorites,
    /// Add or remove a favorite
    Toggle {
        /// Media filename
        name: String,
    },
    /// Remove a favorite (no-op if it is not one)
    Unfavorite {
        /// Media filename
        name: String,
    },
    /// Show a single media item
    Show {
        /// Media filename
        name: String,
    },
    /// Copy a captured file into the library under a timestamped name
    Import {
        /// File to import
        file: PathBuf,
    },
    /// Delete a media file from the library
    Delete {
        /// Media filename
        name: String,
    },
    /// Copy a media file out of the library
    Export {
        /// Media filename
        name: String,
        /// Destination directory (defaults to `export_dir` from the config)
        #[arg(long)]
        to: Option<PathBuf>,
    },
    /// Remove favorites whose files no longer exist
    Prune,
    /// Watch the library and re-list the gallery on changes
    Watch,
    /// Write a sample configuration file
    InitConfig {
        /// Where to write it
        path: PathBuf,
    },
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref library) = self.library {
            config.library_dir = Some(library.clone());
        }
        if let Some(ref favorites) = self.favorites {
            config.favorites_file = Some(favorites.clone());
        }
        if let Some(order) = self.order {
            config.order = order;
        }
        if let Command::Export { to: Some(ref to), .. } = self.command {
            config.export_dir = Some(to.clone());
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
