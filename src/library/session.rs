//! Library session
//!
//! A [`Library`] is built once per session from a directory store and a
//! favorites store. Every call re-reads both; nothing is cached between
//! calls, so a file deleted on disk disappears from the next listing and a
//! newly captured one shows up.
//!
//! Read paths recover from storage failures by returning empty lists.
//! Write paths surface failures to the caller.

use super::reconcile;
use crate::config::{Config, OrderPolicy};
use crate::error::{Error, Result};
use crate::media::{MediaClassifier, MediaItem, MediaResolver};
use crate::store::{
    DirectoryStore, FavoritesStore, FsDirectoryStore, JsonFavoritesStore, validate_name,
};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which branch a favorite toggle took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteChange {
    Added,
    Removed,
}

/// A single media item with what a detail view needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaEntry {
    pub item: MediaItem,
    pub path: PathBuf,
    pub favorite: bool,
}

/// Media library bound to its storage collaborators
pub struct Library<D, F> {
    directory: D,
    favorites: F,
    classifier: MediaClassifier,
    order: OrderPolicy,
    resolver: MediaResolver,
}

impl Library<FsDirectoryStore, JsonFavoritesStore> {
    /// Library on the local filesystem as described by `config`
    pub fn from_config(config: &Config) -> Self {
        let directory = FsDirectoryStore::new(config.library_dir.clone());
        let favorites = JsonFavoritesStore::new(config.get_favorites_file());

        Library::new(directory, favorites)
            .with_classifier(config.classifier())
            .with_order(config.order)
    }
}

impl<D: DirectoryStore, F: FavoritesStore> Library<D, F> {
    /// Create a library with the default classifier and ordering
    pub fn new(directory: D, favorites: F) -> Self {
        let resolver = MediaResolver::new(directory.base_dir().map(Path::to_path_buf));
        Self {
            directory,
            favorites,
            classifier: MediaClassifier::default(),
            order: OrderPolicy::default(),
            resolver,
        }
    }

    pub fn with_classifier(mut self, classifier: MediaClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_order(mut self, order: OrderPolicy) -> Self {
        self.order = order;
        self
    }

    pub fn with_resolver(mut self, resolver: MediaResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn order(&self) -> OrderPolicy {
        self.order
    }

    pub fn classifier(&self) -> &MediaClassifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &MediaResolver {
        &self.resolver
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn favorites_store(&self) -> &F {
        &self.favorites
    }

    /// Current snapshot, empty when the directory cannot be listed
    fn snapshot(&self) -> Vec<String> {
        match self.directory.list_files() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Library directory unavailable, showing empty listing");
                Vec::new()
            }
        }
    }

    /// Persisted favorites, empty when unreadable or corrupt
    fn saved_favorites(&self) -> Vec<String> {
        match self.favorites.load() {
            Ok(favorites) => favorites,
            Err(e) => {
                warn!(error = %e, "Favorites unavailable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Favorites for a read-modify-write cycle
    ///
    /// Corrupt data is replaced by the next write. An unreadable store is
    /// an error so the write cannot clobber favorites it never saw.
    fn favorites_for_update(&self) -> Result<Vec<String>> {
        match self.favorites.load() {
            Ok(favorites) => Ok(favorites),
            Err(e @ Error::MalformedPersistedData { .. }) => {
                warn!(error = %e, "Discarding malformed favorites before update");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Gallery listing for the current snapshot
    pub fn gallery(&self) -> Vec<MediaItem> {
        let names = self.snapshot();
        let items = reconcile::list_gallery(&names, &self.classifier, self.order);
        debug!(files = names.len(), media = items.len(), "Built gallery listing");
        items
    }

    /// Favorited items that still exist, in listing order
    pub fn favorites(&self) -> Vec<MediaItem> {
        let favorites = self.saved_favorites();
        if favorites.is_empty() {
            return Vec::new();
        }

        let names = self.snapshot();
        let items = reconcile::list_favorites(&names, &favorites, &self.classifier);
        debug!(
            saved = favorites.len(),
            shown = items.len(),
            "Built favorites listing"
        );
        items
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.saved_favorites().iter().any(|f| f == name)
    }

    /// Flip the favorite flag of `name` and persist the result
    pub fn toggle_favorite(&mut self, name: &str) -> Result<FavoriteChange> {
        let current = self.favorites_for_update()?;
        let change = if current.iter().any(|f| f == name) {
            FavoriteChange::Removed
        } else {
            FavoriteChange::Added
        };

        let next = reconcile::toggle_favorite(&current, name);
        self.favorites.save(&next)?;

        info!(name, ?change, "Toggled favorite");
        Ok(change)
    }

    /// Remove `name` from favorites. Returns `false` if it was not a
    /// favorite, in which case nothing is written.
    pub fn remove_favorite(&mut self, name: &str) -> Result<bool> {
        let current = self.favorites_for_update()?;
        if !current.iter().any(|f| f == name) {
            debug!(name, "Favorite not found, nothing to remove");
            return Ok(false);
        }

        let next = reconcile::remove_favorite(&current, name);
        self.favorites.save(&next)?;

        info!(name, "Removed favorite");
        Ok(true)
    }

    /// Favorites whose files are gone. Needs a real snapshot.
    pub fn dangling_favorites(&self) -> Result<Vec<String>> {
        let names = self.directory.list_files()?;
        Ok(reconcile::dangling_favorites(&names, &self.saved_favorites()))
    }

    /// Drop dangling favorites from the store, returning what was removed
    ///
    /// Refuses to run when the directory cannot be listed; an unmounted
    /// library must not wipe the favorites list.
    pub fn prune_dangling(&mut self) -> Result<Vec<String>> {
        let names = self.directory.list_files()?;
        let current = self.favorites_for_update()?;

        let dangling = reconcile::dangling_favorites(&names, &current);
        if dangling.is_empty() {
            debug!("No dangling favorites");
            return Ok(dangling);
        }

        let next: Vec<String> = current
            .into_iter()
            .filter(|f| !dangling.contains(f))
            .collect();
        self.favorites.save(&next)?;

        info!(count = dangling.len(), "Pruned dangling favorites");
        Ok(dangling)
    }

    /// Detail view of one media item
    pub fn show(&self, name: &str) -> Result<MediaEntry> {
        let item = self.find(name)?;
        Ok(MediaEntry {
            path: self.resolver.resolve(item.name()),
            favorite: self.is_favorite(name),
            item,
        })
    }

    fn find(&self, name: &str) -> Result<MediaItem> {
        validate_name(name)?;
        let names = self.directory.list_files()?;
        if !names.iter().any(|n| n == name) {
            return Err(Error::MediaNotFound {
                name: name.to_string(),
            });
        }

        let item = MediaItem::new(name, &self.classifier);
        if !item.is_media() {
            return Err(Error::MediaNotFound {
                name: name.to_string(),
            });
        }
        Ok(item)
    }

    /// Copy a captured file into the library under a fresh timestamped name
    pub fn import(&mut self, source: &Path) -> Result<MediaItem> {
        self.import_with_stamp(source, Utc::now().timestamp_millis())
    }

    /// [`Library::import`] with an explicit millisecond stamp
    ///
    /// The stamp is bumped until the name `photo_<stamp><.ext>` is free.
    pub fn import_with_stamp(&mut self, source: &Path, stamp_millis: i64) -> Result<MediaItem> {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "jpg".to_string());

        let names = self.directory.list_files()?;
        let mut stamp = stamp_millis;
        let mut name = format!("photo_{}.{}", stamp, ext);
        while names.iter().any(|n| n == &name) {
            stamp += 1;
            name = format!("photo_{}.{}", stamp, ext);
        }

        let item = MediaItem::new(name, &self.classifier);
        if !item.is_media() {
            return Err(Error::InvalidName {
                name: source.display().to_string(),
            });
        }

        self.directory.import_file(source, item.name())?;
        info!(source = %source.display(), name = item.name(), "Imported capture");
        Ok(item)
    }

    /// Delete a file from the library
    ///
    /// Favorites are left untouched; a favorite of the deleted file becomes
    /// dangling and is hidden until removed.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let item = self.find(name)?;
        self.directory.delete_file(item.name())?;

        if self.is_favorite(name) {
            info!(name, "Deleted file is still a favorite, now dangling");
        }
        Ok(())
    }

    /// Copy a media item out of the library into `dest_dir`
    pub fn export(&self, name: &str, dest_dir: &Path) -> Result<PathBuf> {
        let item = self.find(name)?;
        self.directory.export_file(item.name(), dest_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryDirectoryStore, MemoryFavoritesStore};
    use std::fs;
    use tempfile::tempdir;

    fn names(items: &[MediaItem]) -> Vec<&str> {
        items.iter().map(MediaItem::name).collect()
    }

    fn memory_library(
        files: &[&str],
        favorites: &[&str],
    ) -> Library<MemoryDirectoryStore, MemoryFavoritesStore> {
        Library::new(
            MemoryDirectoryStore::new(files.iter().copied()),
            MemoryFavoritesStore::new(favorites.iter().copied()),
        )
        .with_order(OrderPolicy::Listing)
    }

    #[test]
    fn test_delete_leaves_favorite_dangling() {
        let mut library = memory_library(&["1.jpg", "2.mov", "3.txt"], &["2.mov"]);

        assert_eq!(names(&library.gallery()), ["1.jpg", "2.mov"]);
        assert_eq!(names(&library.favorites()), ["2.mov"]);

        library.delete("2.mov").unwrap();

        assert_eq!(names(&library.gallery()), ["1.jpg"]);
        assert!(library.favorites().is_empty());
        // Still persisted until removed explicitly
        assert_eq!(library.favorites_store().blob(), Some(r#"["2.mov"]"#));

        assert!(library.remove_favorite("2.mov").unwrap());
        assert_eq!(library.favorites_store().blob(), Some("[]"));
    }

    #[test]
    fn test_delete_only_removes_media() {
        let mut library = memory_library(&["a.jpg", ".favorites.json", "notes.txt"], &["a.jpg"]);

        for name in [".favorites.json", "notes.txt", "ghost.jpg"] {
            assert!(matches!(
                library.delete(name),
                Err(Error::MediaNotFound { .. })
            ));
        }
        assert_eq!(
            library.directory().list_files().unwrap(),
            ["a.jpg", ".favorites.json", "notes.txt"]
        );
        assert_eq!(names(&library.favorites()), ["a.jpg"]);
    }

    #[test]
    fn test_filesystem_delete_keeps_favorites_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"i").unwrap();
        let config = Config {
            library_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let mut library = Library::from_config(&config);
        library.toggle_favorite("a.jpg").unwrap();

        assert!(matches!(
            library.delete(".favorites.json"),
            Err(Error::MediaNotFound { .. })
        ));
        assert!(dir.path().join(".favorites.json").exists());
        assert_eq!(names(&library.favorites()), ["a.jpg"]);
    }

    #[test]
    fn test_export_into_library_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"pixels").unwrap();
        let config = Config {
            library_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let library = Library::from_config(&config);

        library.export("a.jpg", dir.path()).unwrap();
        assert_eq!(fs::read(dir.path().join("a.jpg")).unwrap(), b"pixels");
    }

    #[test]
    fn test_toggle_persists_each_branch() {
        let mut library = memory_library(&["a.jpg", "b.jpg"], &[]);

        assert_eq!(library.toggle_favorite("b.jpg").unwrap(), FavoriteChange::Added);
        assert_eq!(library.toggle_favorite("a.jpg").unwrap(), FavoriteChange::Added);
        assert_eq!(
            library.favorites_store().blob(),
            Some(r#"["b.jpg","a.jpg"]"#)
        );
        // Listing order, not favoriting order
        assert_eq!(names(&library.favorites()), ["a.jpg", "b.jpg"]);
        assert!(library.is_favorite("a.jpg"));

        assert_eq!(
            library.toggle_favorite("b.jpg").unwrap(),
            FavoriteChange::Removed
        );
        assert_eq!(library.favorites_store().blob(), Some(r#"["a.jpg"]"#));
    }

    #[test]
    fn test_remove_absent_writes_nothing() {
        let mut library = memory_library(&["a.jpg"], &[]);
        assert!(!library.remove_favorite("ghost.jpg").unwrap());
        assert_eq!(library.favorites_store().blob(), Some("[]"));

        let mut library = Library::new(
            MemoryDirectoryStore::new(["a.jpg"]),
            MemoryFavoritesStore::default(),
        );
        assert!(!library.remove_favorite("ghost.jpg").unwrap());
        assert_eq!(library.favorites_store().blob(), None);
    }

    #[test]
    fn test_unavailable_directory_renders_empty() {
        let library = Library::new(
            MemoryDirectoryStore::unavailable(),
            MemoryFavoritesStore::new(["a.jpg"]),
        );
        assert!(library.gallery().is_empty());
        assert!(library.favorites().is_empty());
        assert!(matches!(
            library.show("a.jpg"),
            Err(Error::StorageUnavailable { .. })
        ));
    }

    #[test]
    fn test_malformed_favorites() {
        let mut library = Library::new(
            MemoryDirectoryStore::new(["a.jpg", "b.jpg"]),
            MemoryFavoritesStore::with_blob("{oops"),
        );
        assert!(library.favorites().is_empty());
        assert_eq!(library.gallery().len(), 2);
        assert!(!library.is_favorite("a.jpg"));

        // The next write replaces the corrupt blob
        assert_eq!(
            library.toggle_favorite("a.jpg").unwrap(),
            FavoriteChange::Added
        );
        assert_eq!(library.favorites_store().blob(), Some(r#"["a.jpg"]"#));
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let mut favorites = MemoryFavoritesStore::new(["a.jpg"]);
        favorites.set_writable(false);
        let mut library = Library::new(MemoryDirectoryStore::new(["a.jpg", "b.jpg"]), favorites);

        assert!(matches!(
            library.toggle_favorite("b.jpg"),
            Err(Error::PersistenceUnavailable { .. })
        ));
        assert!(library.remove_favorite("a.jpg").is_err());
        assert_eq!(names(&library.favorites()), ["a.jpg"]);
    }

    #[test]
    fn test_unreadable_favorites_block_writes() {
        let mut favorites = MemoryFavoritesStore::new(["a.jpg"]);
        favorites.set_readable(false);
        let mut library = Library::new(MemoryDirectoryStore::new(["a.jpg", "b.jpg"]), favorites);

        assert!(library.favorites().is_empty());
        assert!(library.toggle_favorite("b.jpg").is_err());
        assert_eq!(library.favorites_store().blob(), Some(r#"["a.jpg"]"#));
    }

    #[test]
    fn test_prune_dangling() {
        let mut library = memory_library(&["a.jpg", "notes.txt"], &["ghost.mov", "a.jpg", "notes.txt"]);

        assert_eq!(library.dangling_favorites().unwrap(), ["ghost.mov"]);
        assert_eq!(library.prune_dangling().unwrap(), ["ghost.mov"]);
        assert_eq!(
            library.favorites_store().blob(),
            Some(r#"["a.jpg","notes.txt"]"#)
        );
        assert!(library.prune_dangling().unwrap().is_empty());
    }

    #[test]
    fn test_prune_refuses_without_snapshot() {
        let mut library = Library::new(
            MemoryDirectoryStore::unavailable(),
            MemoryFavoritesStore::new(["a.jpg"]),
        );
        assert!(matches!(
            library.prune_dangling(),
            Err(Error::StorageUnavailable { .. })
        ));
        assert_eq!(library.favorites_store().blob(), Some(r#"["a.jpg"]"#));
    }

    #[test]
    fn test_show() {
        let library = memory_library(&["a.jpg", "notes.txt"], &["a.jpg"]);

        let entry = library.show("a.jpg").unwrap();
        assert_eq!(entry.item.kind(), crate::media::MediaKind::Image);
        assert_eq!(entry.path, PathBuf::from("a.jpg"));
        assert!(entry.favorite);

        assert!(matches!(
            library.show("notes.txt"),
            Err(Error::MediaNotFound { .. })
        ));
        assert!(matches!(
            library.show("missing.jpg"),
            Err(Error::MediaNotFound { .. })
        ));
    }

    #[test]
    fn test_import_names() {
        let mut library = memory_library(&["photo_1000.jpg"], &[]);

        let item = library
            .import_with_stamp(Path::new("/captures/IMG.JPG"), 1000)
            .unwrap();
        assert_eq!(item.name(), "photo_1001.jpg");

        let item = library
            .import_with_stamp(Path::new("/captures/clip.MOV"), 1000)
            .unwrap();
        assert_eq!(item.name(), "photo_1000.mov");

        let item = library
            .import_with_stamp(Path::new("/captures/raw_capture"), 2000)
            .unwrap();
        assert_eq!(item.name(), "photo_2000.jpg");

        assert!(matches!(
            library.import_with_stamp(Path::new("/captures/notes.txt"), 3000),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn test_filesystem_session() {
        let dir = tempdir().unwrap();
        let library_dir = dir.path().join("media");
        fs::create_dir_all(&library_dir).unwrap();
        fs::write(library_dir.join("IMG_20240301_000000.jpg"), b"i").unwrap();
        fs::write(library_dir.join("IMG_20240101_000000.jpg"), b"i").unwrap();

        let capture = dir.path().join("capture.png");
        fs::write(&capture, b"png").unwrap();

        let config = Config {
            library_dir: Some(library_dir.clone()),
            ..Config::default()
        };
        let mut library = Library::from_config(&config);

        let imported = library.import_with_stamp(&capture, 1705329000000).unwrap();
        assert_eq!(imported.name(), "photo_1705329000000.png");

        // favorites file lives in the library dir and is never listed
        library.toggle_favorite("IMG_20240301_000000.jpg").unwrap();
        assert!(library_dir.join(".favorites.json").exists());

        assert_eq!(
            names(&library.gallery()),
            [
                "photo_1705329000000.png",
                "IMG_20240101_000000.jpg",
                "IMG_20240301_000000.jpg",
            ]
        );
        assert_eq!(names(&library.favorites()), ["IMG_20240301_000000.jpg"]);

        let entry = library.show("IMG_20240301_000000.jpg").unwrap();
        assert_eq!(entry.path, library_dir.join("IMG_20240301_000000.jpg"));

        let saved = library
            .export("IMG_20240301_000000.jpg", &dir.path().join("saved"))
            .unwrap();
        assert!(saved.exists());

        library.delete("IMG_20240301_000000.jpg").unwrap();
        assert!(library.favorites().is_empty());
        assert_eq!(
            library.dangling_favorites().unwrap(),
            ["IMG_20240301_000000.jpg"]
        );
    }
}
