//! Storage collaborators
//!
//! The reconciler never touches the filesystem itself. It asks a
//! [`DirectoryStore`] for the current snapshot of filenames and a
//! [`FavoritesStore`] for the persisted favorites list. Both fail by
//! returning an "unavailable" error, never a partial result.

pub mod directory;
pub mod favorites;

pub use directory::{FsDirectoryStore, MemoryDirectoryStore};
pub use favorites::{JsonFavoritesStore, MemoryFavoritesStore};

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Source of directory snapshots
pub trait DirectoryStore {
    /// Basenames of the regular files currently in the library directory.
    ///
    /// Order is the store's listing order; callers must not rely on it
    /// beyond that.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Directory the names are relative to, if this store has one on disk
    fn base_dir(&self) -> Option<&Path>;

    /// Copy `source` into the library as `name`. Fails if `name` exists.
    fn import_file(&mut self, source: &Path, name: &str) -> Result<()>;

    /// Remove `name` from the library
    fn delete_file(&mut self, name: &str) -> Result<()>;

    /// Copy `name` into `dest_dir`, returning the written path
    fn export_file(&self, name: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// Persistence for the favorites list
pub trait FavoritesStore {
    /// Persisted favorites, empty if nothing was ever saved
    fn load(&self) -> Result<Vec<String>>;

    /// Replace the persisted favorites with `favorites`
    fn save(&mut self, favorites: &[String]) -> Result<()>;
}

/// Reject names that would escape the flat library directory
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');

    if invalid {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
