//! Trash
//!
//! Soft-deleted wishlists live in `trash/<id>-<stamp>.json`. Deleting and
//! restoring are single renames, so a payload is always in exactly one
//! namespace. The handle (the file name) embeds the deletion stamp, which
//! is what listings report as `deletedAt`.

use std::cmp::Reverse;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{VaultError, VaultResult};
use crate::ids::WishlistId;
use crate::models::{TrashEntry, Wishlist};
use crate::storage::{
    self, active_file_name, valid_handle, FsBackend, Namespace, Stamp, StorageResult,
};

/// The fields a trash listing shows, read without requiring a full wishlist
#[derive(Debug, Default, Deserialize)]
struct EntryFields {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Trash namespace operations
#[derive(Debug, Clone)]
pub struct Trash {
    backend: FsBackend,
}

impl Trash {
    pub fn new(backend: FsBackend) -> Self {
        Self { backend }
    }

    /// Move the active file of `id` into the trash
    ///
    /// Returns the new handle, or `None` if `id` has no active file.
    /// Version history is left alone.
    pub fn move_in(&self, id: &WishlistId) -> StorageResult<Option<String>> {
        let active = active_file_name(id);
        if !self.backend.exists(&Namespace::Active, &active) {
            return Ok(None);
        }

        let mut stamp = Stamp::now();
        let mut handle = stamp.file_name(id.as_str());
        while self.backend.exists(&Namespace::Trash, &handle) {
            stamp = stamp.bumped();
            handle = stamp.file_name(id.as_str());
        }

        self.backend
            .rename((&Namespace::Active, &active), (&Namespace::Trash, &handle))?;
        info!("Moved wishlist {} to trash as {}", id, handle);
        Ok(Some(handle))
    }

    /// All trash entries, most recently deleted first
    ///
    /// Payloads are read loosely; whatever id and title they carry is shown.
    /// Unreadable ones are still listed, titled by their handle.
    pub fn list(&self) -> StorageResult<Vec<TrashEntry>> {
        let mut entries = Vec::new();

        for entry in self.backend.list(&Namespace::Trash)? {
            let stamp = Stamp::split_suffix(entry.stem())
                .map(|(_, stamp)| stamp)
                .unwrap_or_else(|| Stamp::new(entry.modified));

            let fields = match self.peek(&entry.name) {
                Ok(Some(fields)) => fields,
                Ok(None) => continue, // purged or restored meanwhile
                Err(details) => {
                    warn!("Unreadable trash entry {}: {}", entry.name, details);
                    EntryFields::default()
                }
            };

            entries.push((
                stamp,
                TrashEntry {
                    id: fields.id.and_then(|id| WishlistId::parse(id).ok()),
                    title: fields
                        .title
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| entry.name.clone()),
                    handle: entry.name,
                    deleted_at: stamp.at,
                },
            ));
        }

        entries.sort_by_key(|(stamp, _)| Reverse(*stamp));
        Ok(entries.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Read the wishlist stored under `handle`
    pub fn read(&self, handle: &str) -> VaultResult<Wishlist> {
        if !valid_handle(handle) {
            return Err(VaultError::TrashEntryNotFound(handle.to_string()));
        }
        self.read_payload(handle)?
            .ok_or_else(|| VaultError::TrashEntryNotFound(handle.to_string()))
    }

    fn peek(&self, handle: &str) -> Result<Option<EntryFields>, String> {
        let Some(bytes) = self
            .backend
            .read(&Namespace::Trash, handle)
            .map_err(|e| e.to_string())?
        else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| e.to_string())
    }

    fn read_payload(&self, handle: &str) -> StorageResult<Option<Wishlist>> {
        match self.backend.read(&Namespace::Trash, handle)? {
            Some(bytes) => {
                let path = self.backend.path(&Namespace::Trash, handle);
                storage::decode(&bytes, &path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Move `handle` back to the active namespace as `wishlist`
    ///
    /// The entry is first rewritten in place with the final payload, then
    /// renamed to `<wishlist.id>.json`. The rename is the commit point: if
    /// anything fails before it, the entry is still in the trash and the
    /// restore can simply be retried.
    pub fn commit_restore(&self, handle: &str, wishlist: &Wishlist) -> StorageResult<()> {
        self.backend
            .write(&Namespace::Trash, handle, &storage::encode(wishlist)?)?;
        self.backend.rename(
            (&Namespace::Trash, handle),
            (&Namespace::Active, &active_file_name(&wishlist.id)),
        )?;
        info!("Restored trash entry {} as wishlist {}", handle, wishlist.id);
        Ok(())
    }

    /// Permanently delete an entry
    pub fn purge(&self, handle: &str) -> VaultResult<()> {
        if !valid_handle(handle) || !self.backend.remove(&Namespace::Trash, handle)? {
            return Err(VaultError::TrashEntryNotFound(handle.to_string()));
        }
        info!("Purged trash entry {}", handle);
        Ok(())
    }

    /// Number of entries in the trash
    pub fn count(&self) -> StorageResult<usize> {
        Ok(self.backend.list(&Namespace::Trash)?.len())
    }
}
