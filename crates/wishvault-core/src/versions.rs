//! Version retention
//!
//! Before a wishlist is overwritten its current file is moved into
//! `versions/<id>/` under a capture stamp, and the directory is pruned back
//! to the configured number of snapshots. The snapshot just taken is always
//! kept.
//!
//! Capture order is the stamp in the file name; stamps are made strictly
//! increasing per wishlist, so rapid saves never share a name. Files whose
//! names don't parse fall back to their mtime.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{VaultError, VaultResult};
use crate::ids::WishlistId;
use crate::models::{VersionInfo, Wishlist};
use crate::storage::{
    self, active_file_name, valid_handle, Entry, FsBackend, Namespace, Stamp, StorageResult,
};

/// Snapshots and prunes wishlist versions
#[derive(Debug, Clone)]
pub struct VersionManager {
    backend: FsBackend,
    max_versions: usize,
}

impl VersionManager {
    /// `max_versions` is clamped to at least 1
    pub fn new(backend: FsBackend, max_versions: usize) -> Self {
        Self {
            backend,
            max_versions: max_versions.max(1),
        }
    }

    pub fn max_versions(&self) -> usize {
        self.max_versions
    }

    /// Move the active file of `id` into its version history
    ///
    /// No-op (returns `None`) when there is no active file. Returns the
    /// handle of the new snapshot otherwise. Pruning failures are logged
    /// and do not fail the call.
    pub fn snapshot_if_exists(&self, id: &WishlistId) -> StorageResult<Option<String>> {
        let active = active_file_name(id);
        if !self.backend.exists(&Namespace::Active, &active) {
            return Ok(None);
        }

        let ns = Namespace::Versions(id.clone());
        let newest = self
            .backend
            .list(&ns)?
            .iter()
            .filter_map(|e| Stamp::from_file_name(&e.name, id.as_str()))
            .max();

        let mut stamp = Stamp::now_after(newest.as_ref());
        let mut handle = stamp.file_name(id.as_str());
        while self.backend.exists(&ns, &handle) {
            stamp = stamp.bumped();
            handle = stamp.file_name(id.as_str());
        }

        self.backend
            .rename((&Namespace::Active, &active), (&ns, &handle))?;
        debug!("Snapshot {} taken for wishlist {}", handle, id);

        self.prune(id, &handle);
        Ok(Some(handle))
    }

    /// Delete all but the newest snapshots, never touching `keep`
    fn prune(&self, id: &WishlistId, keep: &str) {
        let ns = Namespace::Versions(id.clone());
        let entries = match self.backend.list(&ns) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not list versions of {} for pruning: {}", id, e);
                return;
            }
        };

        let mut others: Vec<Entry> = entries.into_iter().filter(|e| e.name != keep).collect();
        others.sort_by_key(|e| Reverse(capture_key(e, id)));

        for stale in others.into_iter().skip(self.max_versions - 1) {
            match self.backend.remove(&ns, &stale.name) {
                Ok(_) => debug!("Pruned version {} of wishlist {}", stale.name, id),
                Err(e) => warn!("Failed to prune version {} of {}: {}", stale.name, id, e),
            }
        }
    }

    /// Versions of `id`, newest first
    pub fn list(&self, id: &WishlistId) -> StorageResult<Vec<VersionInfo>> {
        let mut entries = self.backend.list(&Namespace::Versions(id.clone()))?;
        entries.sort_by_key(|e| Reverse(capture_key(e, id)));

        Ok(entries
            .into_iter()
            .map(|e| VersionInfo {
                captured_at: capture_key(&e, id).0,
                handle: e.name,
            })
            .collect())
    }

    /// Read a stored version
    pub fn read(&self, id: &WishlistId, handle: &str) -> VaultResult<Wishlist> {
        let not_found = || VaultError::VersionNotFound {
            wishlist_id: id.clone(),
            handle: handle.to_string(),
        };
        if !valid_handle(handle) {
            return Err(not_found());
        }

        let ns = Namespace::Versions(id.clone());
        let bytes = self.backend.read(&ns, handle)?.ok_or_else(not_found)?;
        Ok(storage::decode(&bytes, &self.backend.path(&ns, handle))?)
    }

    /// Delete a stored version. Returns `false` if it was already gone.
    pub fn remove(&self, id: &WishlistId, handle: &str) -> StorageResult<bool> {
        self.backend.remove(&Namespace::Versions(id.clone()), handle)
    }
}

/// Sort key for capture order: stamp from the name, else mtime; mtime breaks ties
fn capture_key(entry: &Entry, id: &WishlistId) -> (DateTime<Utc>, u32, DateTime<Utc>) {
    match Stamp::from_file_name(&entry.name, id.as_str()) {
        Some(stamp) => (stamp.at, stamp.seq, entry.modified),
        None => (entry.modified, 0, entry.modified),
    }
}
