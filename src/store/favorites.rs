//! Favorites persistence
//!
//! The favorites list is stored as a single JSON array of filenames, in
//! insertion order. Order carries no meaning for membership.

use super::FavoritesStore;
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Decode a favorites blob
pub fn decode(blob: &str, path: Option<&Path>) -> Result<Vec<String>> {
    serde_json::from_str(blob).map_err(|e| Error::MalformedPersistedData {
        path: path.map(Path::to_path_buf),
        message: e.to_string(),
    })
}

/// Encode a favorites list as a compact JSON array
pub fn encode(favorites: &[String]) -> Result<String> {
    Ok(serde_json::to_string(favorites)?)
}

fn write_favorites(file: File, favorites: &[String]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, favorites)?;
    writer.flush()
}

/// Favorites stored in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFavoritesStore {
    path: Option<PathBuf>,
}

impl JsonFavoritesStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn configured_path(&self) -> Result<&Path> {
        self.path
            .as_deref()
            .ok_or_else(|| Error::PersistenceUnavailable {
                path: None,
                message: "no favorites file configured".to_string(),
            })
    }
}

impl FavoritesStore for JsonFavoritesStore {
    fn load(&self) -> Result<Vec<String>> {
        let path = self.configured_path()?;

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(?path, "Favorites file does not exist, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Error::PersistenceUnavailable {
                    path: Some(path.to_path_buf()),
                    message: format!("Failed to read favorites file: {}", e),
                });
            }
        };

        let favorites = decode(&content, Some(path))?;
        debug!(?path, count = favorites.len(), "Loaded favorites");
        Ok(favorites)
    }

    fn save(&mut self, favorites: &[String]) -> Result<()> {
        let path = self.configured_path()?;
        let unavailable = |message: String| Error::PersistenceUnavailable {
            path: Some(path.to_path_buf()),
            message,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| unavailable(format!("Failed to create favorites directory: {}", e)))?;
        }

        // Write to a temporary file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");

        let file = File::create(&temp_path)
            .map_err(|e| unavailable(format!("Failed to create temp favorites file: {}", e)))?;

        let written = write_favorites(file, favorites)
            .map_err(|e| unavailable(format!("Failed to write favorites file: {}", e)))
            .and_then(|()| {
                fs::rename(&temp_path, path).map_err(|e| {
                    unavailable(format!("Failed to rename temp favorites file: {}", e))
                })
            });

        if let Err(e) = written {
            // Don't leave a half-written temp file behind
            if let Err(remove_err) = fs::remove_file(&temp_path) {
                debug!(path = %temp_path.display(), error = %remove_err, "Could not remove temp favorites file");
            }
            return Err(e);
        }

        info!(count = favorites.len(), path = %path.display(), "Saved favorites");
        Ok(())
    }
}

/// Favorites held in memory as an encoded blob
///
/// Keeps the same decode path as the file store, so corrupt data and
/// unavailable storage can be simulated.
#[derive(Debug, Clone)]
pub struct MemoryFavoritesStore {
    blob: Option<String>,
    readable: bool,
    writable: bool,
}

impl Default for MemoryFavoritesStore {
    fn default() -> Self {
        Self {
            blob: None,
            readable: true,
            writable: true,
        }
    }
}

impl MemoryFavoritesStore {
    pub fn new<I, S>(favorites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let favorites: Vec<String> = favorites.into_iter().map(Into::into).collect();
        Self {
            blob: serde_json::to_string(&favorites).ok(),
            ..Self::default()
        }
    }

    /// Store whose blob is exactly `blob`, parseable or not
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            ..Self::default()
        }
    }

    pub fn set_readable(&mut self, readable: bool) {
        self.readable = readable;
    }

    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    /// Raw persisted blob, `None` if never written
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl FavoritesStore for MemoryFavoritesStore {
    fn load(&self) -> Result<Vec<String>> {
        if !self.readable {
            return Err(Error::PersistenceUnavailable {
                path: None,
                message: "memory store marked unreadable".to_string(),
            });
        }
        match &self.blob {
            Some(blob) => decode(blob, None),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, favorites: &[String]) -> Result<()> {
        if !self.writable {
            return Err(Error::PersistenceUnavailable {
                path: None,
                message: "memory store marked unwritable".to_string(),
            });
        }
        self.blob = Some(encode(favorites)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_never_written() {
        let dir = tempdir().unwrap();
        let store = JsonFavoritesStore::new(Some(dir.path().join("favorites.json")));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("favorites.json");
        let mut store = JsonFavoritesStore::new(Some(path.clone()));

        let favorites = vec!["b.mov".to_string(), "a.jpg".to_string()];
        store.save(&favorites).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), r#"["b.mov","a.jpg"]"#);
        assert_eq!(store.load().unwrap(), favorites);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, r#"{"not": "a list"}"#).unwrap();

        let store = JsonFavoritesStore::new(Some(path));
        assert!(matches!(
            store.load(),
            Err(Error::MalformedPersistedData { path: Some(_), .. })
        ));
    }

    #[test]
    fn test_unconfigured() {
        let mut store = JsonFavoritesStore::new(None);
        assert!(matches!(
            store.load(),
            Err(Error::PersistenceUnavailable { .. })
        ));
        assert!(matches!(
            store.save(&["a.jpg".to_string()]),
            Err(Error::PersistenceUnavailable { .. })
        ));
    }

    #[test]
    fn test_save_into_unwritable_location() {
        let dir = tempdir().unwrap();
        // A regular file where the parent directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let mut store = JsonFavoritesStore::new(Some(blocker.join("favorites.json")));
        assert!(matches!(
            store.save(&["a.jpg".to_string()]),
            Err(Error::PersistenceUnavailable { .. })
        ));
    }

    #[test]
    fn test_failed_save_cleans_up_temp_file() {
        let dir = tempdir().unwrap();
        // A directory where the favorites file should be, so the rename fails
        let path = dir.path().join("favorites.json");
        fs::create_dir(&path).unwrap();

        let mut store = JsonFavoritesStore::new(Some(path.clone()));
        assert!(matches!(
            store.save(&["a.jpg".to_string()]),
            Err(Error::PersistenceUnavailable { .. })
        ));
        assert!(!path.with_extension("tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn test_memory_store_failures() {
        let mut store = MemoryFavoritesStore::new(["a.jpg"]);
        assert_eq!(store.load().unwrap(), ["a.jpg"]);

        store.set_writable(false);
        assert!(store.save(&[]).is_err());
        assert_eq!(store.blob(), Some(r#"["a.jpg"]"#));

        store.set_readable(false);
        assert!(store.load().is_err());

        let store = MemoryFavoritesStore::with_blob("not json");
        assert!(matches!(
            store.load(),
            Err(Error::MalformedPersistedData { .. })
        ));
    }
}
