//! Directory snapshot stores

use super::{DirectoryStore, validate_name};
use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Library directory on the local filesystem
///
/// Listing is flat (subdirectories are skipped) and sorted by filename so
/// the "listing order" is reproducible across platforms.
#[derive(Debug, Clone)]
pub struct FsDirectoryStore {
    root: Option<PathBuf>,
}

impl FsDirectoryStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn root(&self) -> Result<&Path> {
        self.root
            .as_deref()
            .ok_or_else(|| Error::StorageUnavailable {
                path: None,
                message: "no library directory configured".to_string(),
            })
    }

    fn unavailable(&self, message: impl ToString) -> Error {
        Error::StorageUnavailable {
            path: self.root.clone(),
            message: message.to_string(),
        }
    }

    fn existing_file(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self.root()?.join(name);
        if !path.is_file() {
            return Err(Error::MediaNotFound {
                name: name.to_string(),
            });
        }
        Ok(path)
    }
}

impl DirectoryStore for FsDirectoryStore {
    fn list_files(&self) -> Result<Vec<String>> {
        let root = self.root()?;
        if !root.is_dir() {
            return Err(self.unavailable("not a directory"));
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                // Reading the directory itself failed
                Err(e) if e.depth() == 0 => return Err(self.unavailable(e)),
                Err(e) => {
                    warn!(path = ?e.path(), error = %e, "Skipping unreadable library entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => debug!(path = ?entry.path(), "Skipping non UTF-8 filename"),
            }
        }

        debug!(?root, count = names.len(), "Listed library directory");
        Ok(names)
    }

    fn base_dir(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn import_file(&mut self, source: &Path, name: &str) -> Result<()> {
        validate_name(name)?;
        let root = self.root()?;
        fs::create_dir_all(root)?;

        let dest = root.join(name);
        copy_new(source, &dest)?;
        info!(source = %source.display(), dest = %dest.display(), "Imported media file");
        Ok(())
    }

    fn delete_file(&mut self, name: &str) -> Result<()> {
        let path = self.existing_file(name)?;
        fs::remove_file(&path)?;
        info!(path = %path.display(), "Deleted media file");
        Ok(())
    }

    fn export_file(&self, name: &str, dest_dir: &Path) -> Result<PathBuf> {
        let source = self.existing_file(name)?;
        fs::create_dir_all(dest_dir)?;

        let dest = dest_dir.join(name);
        if same_file(&source, &dest) {
            debug!(path = %dest.display(), "Export target is the library file itself");
            return Ok(dest);
        }

        copy_new(&source, &dest)?;
        info!(source = %source.display(), dest = %dest.display(), "Exported media file");
        Ok(dest)
    }
}

/// Copy `source` to `dest`, refusing to replace an existing file
fn copy_new(source: &Path, dest: &Path) -> Result<()> {
    let mut reader = fs::File::open(source)?;
    let mut writer = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", dest.display()),
            )),
            _ => Error::Io(e),
        })?;

    if let Err(e) = io::copy(&mut reader, &mut writer) {
        drop(writer);
        // Only remove what this call created
        let _ = fs::remove_file(dest);
        return Err(e.into());
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// In-memory directory for tests and embedding
///
/// `None` files model an unmounted or unreadable directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectoryStore {
    files: Option<Vec<String>>,
}

impl MemoryDirectoryStore {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: Some(files.into_iter().map(Into::into).collect()),
        }
    }

    /// A directory that cannot be listed
    pub fn unavailable() -> Self {
        Self { files: None }
    }

    pub fn set_available(&mut self, available: bool) {
        match (available, self.files.is_some()) {
            (true, false) => self.files = Some(Vec::new()),
            (false, true) => self.files = None,
            _ => {}
        }
    }

    fn files_mut(&mut self) -> Result<&mut Vec<String>> {
        self.files.as_mut().ok_or_else(|| Error::StorageUnavailable {
            path: None,
            message: "memory directory marked unavailable".to_string(),
        })
    }
}

impl DirectoryStore for MemoryDirectoryStore {
    fn list_files(&self) -> Result<Vec<String>> {
        self.files.clone().ok_or_else(|| Error::StorageUnavailable {
            path: None,
            message: "memory directory marked unavailable".to_string(),
        })
    }

    fn base_dir(&self) -> Option<&Path> {
        None
    }

    fn import_file(&mut self, _source: &Path, name: &str) -> Result<()> {
        validate_name(name)?;
        let files = self.files_mut()?;
        if files.iter().any(|f| f == name) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{name} already exists"),
            )));
        }
        files.push(name.to_string());
        Ok(())
    }

    fn delete_file(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        let files = self.files_mut()?;
        let before = files.len();
        files.retain(|f| f != name);
        if files.len() == before {
            return Err(Error::MediaNotFound {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn export_file(&self, name: &str, dest_dir: &Path) -> Result<PathBuf> {
        validate_name(name)?;
        if !self.list_files()?.iter().any(|f| f == name) {
            return Err(Error::MediaNotFound {
                name: name.to_string(),
            });
        }
        Ok(dest_dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_files_flat_and_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.mov"), b"v").unwrap();
        fs::write(dir.path().join("a.jpg"), b"i").unwrap();
        fs::write(dir.path().join("c.txt"), b"t").unwrap();
        fs::create_dir(dir.path().join("thumbs")).unwrap();
        fs::write(dir.path().join("thumbs").join("d.jpg"), b"i").unwrap();

        let store = FsDirectoryStore::new(Some(dir.path().to_path_buf()));
        assert_eq!(store.list_files().unwrap(), ["a.jpg", "b.mov", "c.txt"]);
    }

    #[test]
    fn test_list_files_unconfigured() {
        let store = FsDirectoryStore::new(None);
        let err = store.list_files().unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { path: None, .. }));
    }

    #[test]
    fn test_list_files_missing_dir() {
        let dir = tempdir().unwrap();
        let store = FsDirectoryStore::new(Some(dir.path().join("gone")));
        assert!(matches!(
            store.list_files(),
            Err(Error::StorageUnavailable { path: Some(_), .. })
        ));
    }

    #[test]
    fn test_import_delete_export() {
        let dir = tempdir().unwrap();
        let library = dir.path().join("library");
        let source = dir.path().join("capture.jpg");
        fs::write(&source, b"pixels").unwrap();

        let mut store = FsDirectoryStore::new(Some(library.clone()));
        store.import_file(&source, "photo_1.jpg").unwrap();
        assert_eq!(store.list_files().unwrap(), ["photo_1.jpg"]);

        // Importing over an existing name is refused and leaves it intact
        fs::write(&source, b"other").unwrap();
        assert!(matches!(
            store.import_file(&source, "photo_1.jpg"),
            Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::AlreadyExists
        ));
        fs::write(&source, b"pixels").unwrap();

        let exported = store
            .export_file("photo_1.jpg", &dir.path().join("saved"))
            .unwrap();
        assert_eq!(fs::read(&exported).unwrap(), b"pixels");

        store.delete_file("photo_1.jpg").unwrap();
        assert!(store.list_files().unwrap().is_empty());
        assert!(matches!(
            store.delete_file("photo_1.jpg"),
            Err(Error::MediaNotFound { .. })
        ));
    }

    #[test]
    fn test_export_into_library_keeps_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"pixels").unwrap();

        let store = FsDirectoryStore::new(Some(dir.path().to_path_buf()));
        let exported = store.export_file("a.jpg", dir.path()).unwrap();

        assert_eq!(exported, dir.path().join("a.jpg"));
        assert_eq!(fs::read(dir.path().join("a.jpg")).unwrap(), b"pixels");
    }

    #[test]
    fn test_export_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let library = dir.path().join("library");
        let saved = dir.path().join("saved");
        fs::create_dir_all(&library).unwrap();
        fs::create_dir_all(&saved).unwrap();
        fs::write(library.join("a.jpg"), b"new").unwrap();
        fs::write(saved.join("a.jpg"), b"old").unwrap();

        let store = FsDirectoryStore::new(Some(library));
        let err = store.export_file("a.jpg", &saved).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::AlreadyExists));
        assert_eq!(fs::read(saved.join("a.jpg")).unwrap(), b"old");
    }

    #[cfg(unix)]
    #[test]
    fn test_stale_symlink_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"i").unwrap();
        fs::write(dir.path().join("b.mov"), b"v").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.jpg"), dir.path().join("stale_link"))
            .unwrap();

        let store = FsDirectoryStore::new(Some(dir.path().to_path_buf()));
        assert_eq!(store.list_files().unwrap(), ["a.jpg", "b.mov"]);
    }

    #[test]
    fn test_delete_rejects_traversal() {
        let dir = tempdir().unwrap();
        let mut store = FsDirectoryStore::new(Some(dir.path().to_path_buf()));
        assert!(matches!(
            store.delete_file("../secret.jpg"),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryDirectoryStore::new(["a.jpg", "b.mov"]);
        store.import_file(Path::new("/tmp/x.png"), "c.png").unwrap();
        store.delete_file("a.jpg").unwrap();
        assert_eq!(store.list_files().unwrap(), ["b.mov", "c.png"]);

        store.set_available(false);
        assert!(store.list_files().is_err());
        assert!(MemoryDirectoryStore::unavailable().list_files().is_err());
    }
}
