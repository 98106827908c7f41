//! Filesystem backend
//!
//! Raw byte I/O over the three namespaces of the data root:
//!
//! ```text
//! <root>/
//! ├── <id>.json                      # active wishlists
//! ├── versions/<id>/<id>-<stamp>.json
//! └── trash/<id>-<stamp>.json
//! ```
//!
//! Writes are atomic (write to a hidden temp file, sync, rename), so a
//! reader never observes a partially written payload. Moves between
//! namespaces are single renames.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::error::{StorageError, StorageResult};
use crate::ids::WishlistId;

const VERSIONS_DIR: &str = "versions";
const TRASH_DIR: &str = "trash";
const EXTENSION: &str = ".json";

/// Logical area of the data root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
    Active,
    Versions(WishlistId),
    Trash,
}

/// A stored file as seen by [`FsBackend::list`]
#[derive(Debug, Clone)]
pub struct Entry {
    /// File name including the `.json` extension
    pub name: String,
    pub modified: DateTime<Utc>,
}

impl Entry {
    /// File name without the `.json` extension
    pub fn stem(&self) -> &str {
        self.name.strip_suffix(EXTENSION).unwrap_or(&self.name)
    }
}

/// Byte-level storage rooted at a data directory
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Open the backend, creating the namespace directories if needed
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let backend = Self { root: root.into() };
        for dir in [
            backend.root.clone(),
            backend.root.join(VERSIONS_DIR),
            backend.root.join(TRASH_DIR),
        ] {
            fs::create_dir_all(&dir)
                .map_err(|source| StorageError::CreateDirectory { path: dir, source })?;
        }
        Ok(backend)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory backing a namespace
    pub fn dir(&self, ns: &Namespace) -> PathBuf {
        match ns {
            Namespace::Active => self.root.clone(),
            Namespace::Versions(id) => self.root.join(VERSIONS_DIR).join(id.as_str()),
            Namespace::Trash => self.root.join(TRASH_DIR),
        }
    }

    /// Full path of a file in a namespace
    pub fn path(&self, ns: &Namespace, name: &str) -> PathBuf {
        self.dir(ns).join(name)
    }

    /// Check if a file exists
    pub fn exists(&self, ns: &Namespace, name: &str) -> bool {
        self.path(ns, name).is_file()
    }

    /// Read a file. Returns `None` if it doesn't exist.
    pub fn read(&self, ns: &Namespace, name: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path(ns, name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_read(e, path)),
        }
    }

    /// Atomically create or replace a file
    pub fn write(&self, ns: &Namespace, name: &str, data: &[u8]) -> StorageResult<()> {
        atomic_write(&self.path(ns, name), data)
    }

    /// Move a file, creating the target directory if needed
    ///
    /// Replaces the target if it exists; callers check first.
    pub fn rename(
        &self,
        from: (&Namespace, &str),
        to: (&Namespace, &str),
    ) -> StorageResult<()> {
        let from_path = self.path(from.0, from.1);
        let to_path = self.path(to.0, to.1);

        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::rename(&from_path, &to_path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound { path: from_path },
            _ => StorageError::RenameFailed {
                from: from_path,
                to: to_path,
                source,
            },
        })
    }

    /// Delete a file. Returns `false` if it was already gone.
    pub fn remove(&self, ns: &Namespace, name: &str) -> StorageResult<bool> {
        let path = self.path(ns, name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }

    /// List the `.json` files of a namespace
    ///
    /// Temp files and subdirectories are skipped. A missing directory
    /// lists as empty.
    pub fn list(&self, ns: &Namespace) -> StorageResult<Vec<Entry>> {
        let dir = self.dir(ns);
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from_read(e, dir)),
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| StorageError::from_read(e, dir.clone()))?;
            let Some(name) = dir_entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') || !name.ends_with(EXTENSION) {
                continue;
            }

            // Entries can vanish between read_dir and stat; skip them.
            let metadata = match dir_entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::from_read(e, dir_entry.path())),
            };
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            entries.push(Entry { name, modified });
        }
        Ok(entries)
    }

    /// Ids that have a version directory, including deleted wishlists
    pub fn version_owners(&self) -> StorageResult<Vec<WishlistId>> {
        let dir = self.root.join(VERSIONS_DIR);
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from_read(e, dir)),
        };

        let mut ids = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| StorageError::from_read(e, dir.clone()))?;
            let is_dir = dir_entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(id) = dir_entry
                .file_name()
                .to_str()
                .and_then(|name| WishlistId::parse(name).ok())
            {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

/// File name of an active wishlist
pub fn active_file_name(id: &WishlistId) -> String {
    format!("{}{}", id, EXTENSION)
}

/// Write data to a file atomically
///
/// 1. Write to a hidden temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{}.tmp", file_name));

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StorageError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        }
    })
}
