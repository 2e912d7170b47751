//! Media Shelf - a small library for captured photos and videos
//!
//! This library provides:
//! - Extension-based media classification and filename order keys
//! - Gallery and favorites listings rebuilt from a fresh directory snapshot
//! - A favorites list that tolerates files deleted out from under it
//! - Filesystem and in-memory storage collaborators
//! - Optional watching of the library directory

pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod media;
pub mod store;
pub mod watch;

pub use cli::{Cli, Command};
pub use config::{Config, ConfigError, OrderPolicy};
pub use error::{Error, Result};
pub use library::{FavoriteChange, Library, MediaEntry};
pub use media::{MediaClassifier, MediaItem, MediaKind, MediaResolver, classify, extract_order_key, is_media};
pub use store::{DirectoryStore, FavoritesStore, FsDirectoryStore, JsonFavoritesStore};
pub use watch::LibraryEvent;
