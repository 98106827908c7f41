//! Unified storage interface
//!
//! The `Store` owns a data root and coordinates:
//! - the storage backend (active, versions and trash namespaces)
//! - version retention (snapshot before every overwrite)
//! - the trash (soft delete, restore, purge)
//! - per-wishlist locks
//!
//! Every mutation of an existing wishlist runs as one sequence under that
//! wishlist's lock: load, apply the change in memory, snapshot the current
//! file, write the new one. A change that fails validation never takes a
//! snapshot.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open()?;
//!
//! let wishlist = store.create(NewWishlist::titled("Birthday"))?;
//! let item = store.append_item(&wishlist.id, "Book", Some("example.com/book"))?;
//! store.update_item(&wishlist.id, &item.id, ItemPatch::default().take(Some("Ann".into())))?;
//! ```

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{VaultError, VaultResult};
use crate::ids::{IdGenerator, TimeRandomIds, WishlistId};
use crate::listing;
use crate::locks::{KeyGuard, KeyedLocks};
use crate::models::{
    Item, ItemPatch, NewWishlist, StoreStats, TrashEntry, VersionInfo, Wishlist, WishlistSummary,
};
use crate::storage::{self, active_file_name, FsBackend, Namespace};
use crate::trash::Trash;
use crate::versions::VersionManager;

/// How many times a generated id is redrawn before giving up
const MAX_ID_ATTEMPTS: usize = 16;

/// Unified storage interface for wishvault
pub struct Store {
    backend: FsBackend,
    versions: VersionManager,
    trash: Trash,
    locks: KeyedLocks,
    /// Held shared from snapshot to write, exclusively by listing scans
    saving: RwLock<()>,
    ids: Box<dyn IdGenerator>,
    config: Config,
}

impl Store {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the store with a specific configuration
    ///
    /// Creates the data root and its `versions/` and `trash/` directories
    /// if needed.
    pub fn open_with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let backend = FsBackend::open(&config.data_dir)
            .with_context(|| format!("Failed to open data directory: {:?}", config.data_dir))?;
        debug!("Opened store at {:?}", config.data_dir);

        Ok(Self {
            versions: VersionManager::new(backend.clone(), config.max_versions),
            trash: Trash::new(backend.clone()),
            backend,
            locks: KeyedLocks::new(),
            saving: RwLock::new(()),
            ids: Box::new(TimeRandomIds),
            config,
        })
    }

    /// Replace the id generator used for new wishlists and items
    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Wishlist Operations ====================

    /// Create a wishlist
    ///
    /// Without an id one is generated. With an id that already exists, the
    /// existing wishlist is snapshotted and then overwritten.
    pub fn create(&self, new: NewWishlist) -> VaultResult<Wishlist> {
        let items = self.prepare_items(new.items)?;

        let (id, _guard) = match new.id {
            Some(id) => {
                let guard = self.locks.lock(id.as_str());
                (id, guard)
            }
            None => self.claim_fresh_id()?,
        };

        let title = new
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.config.default_title.clone());
        let mut wishlist = Wishlist::new(id, title);
        wishlist.items = items;

        let _saving = self.saving.read();
        if let Some(handle) = self.versions.snapshot_if_exists(&wishlist.id)? {
            info!("Overwriting wishlist {} (previous kept as {})", wishlist.id, handle);
        }
        self.persist(&wishlist)?;
        debug!("Created wishlist {}", wishlist.id);
        Ok(wishlist)
    }

    /// Get a wishlist by id
    ///
    /// Waits for a save in progress, during which the active file is
    /// briefly absent.
    pub fn get(&self, id: &WishlistId) -> VaultResult<Wishlist> {
        let _guard = self.locks.lock(id.as_str());
        self.load(id)
    }

    /// Change the title of a wishlist
    pub fn rename_title(&self, id: &WishlistId, title: &str) -> VaultResult<Wishlist> {
        let (wishlist, ()) = self.mutate(id, |wishlist| {
            wishlist.set_title(title);
            Ok(())
        })?;
        Ok(wishlist)
    }

    /// Summaries of all active wishlists, most recently updated first
    ///
    /// Never fails because of a single unreadable file. Waits for saves in
    /// progress, so a wishlist is never missed between its snapshot and
    /// its write.
    pub fn list_summaries(&self) -> VaultResult<Vec<WishlistSummary>> {
        let _scan = self.saving.write();
        Ok(listing::list_summaries(&self.backend)?)
    }

    // ==================== Item Operations ====================

    /// Append a free item; text is trimmed and must not be empty
    pub fn append_item(
        &self,
        id: &WishlistId,
        text: &str,
        link: Option<&str>,
    ) -> VaultResult<Item> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VaultError::InvalidArgument(
                "item text must not be empty".to_string(),
            ));
        }

        let (_, item) = self.mutate(id, |wishlist| {
            let item = Item::new(self.fresh_item_id(&wishlist.items)?, text, link);
            wishlist.items.push(item.clone());
            Ok(item)
        })?;
        Ok(item)
    }

    /// Update an item's text, link and/or claim
    pub fn update_item(
        &self,
        id: &WishlistId,
        item_id: &str,
        patch: ItemPatch,
    ) -> VaultResult<Item> {
        let (_, item) = self.mutate(id, |wishlist| {
            let item = wishlist
                .item_mut(item_id)
                .ok_or_else(|| VaultError::ItemNotFound {
                    wishlist_id: id.clone(),
                    item_id: item_id.to_string(),
                })?;
            item.apply(patch);
            Ok(item.clone())
        })?;
        Ok(item)
    }

    /// Remove an item
    pub fn remove_item(&self, id: &WishlistId, item_id: &str) -> VaultResult<()> {
        self.mutate(id, |wishlist| {
            wishlist
                .remove_item(item_id)
                .map(|_| ())
                .ok_or_else(|| VaultError::ItemNotFound {
                    wishlist_id: id.clone(),
                    item_id: item_id.to_string(),
                })
        })?;
        Ok(())
    }

    // ==================== Version Operations ====================

    /// Stored versions of a wishlist, newest first
    ///
    /// Works for deleted wishlists too; their history is kept.
    pub fn list_versions(&self, id: &WishlistId) -> VaultResult<Vec<VersionInfo>> {
        Ok(self.versions.list(id)?)
    }

    /// Read a stored version without restoring it
    pub fn get_version(&self, id: &WishlistId, handle: &str) -> VaultResult<Wishlist> {
        self.versions.read(id, handle)
    }

    /// Make a stored version the active wishlist again
    ///
    /// The current wishlist, if any, is snapshotted first. The promoted
    /// version leaves the history. Also recovers a wishlist whose active
    /// file is missing.
    pub fn restore_version(&self, id: &WishlistId, handle: &str) -> VaultResult<Wishlist> {
        let _guard = self.locks.lock(id.as_str());

        // Read before snapshotting: pruning may remove this version
        let mut wishlist = self.versions.read(id, handle)?;

        let saving = self.saving.read();
        self.versions.snapshot_if_exists(id)?;
        wishlist.id = id.clone();
        wishlist.touch();
        self.persist(&wishlist)?;
        drop(saving);

        match self.versions.remove(id, handle) {
            Ok(_) => {}
            Err(e) => warn!("Restored version {} of {} but could not remove it: {}", handle, id, e),
        }
        info!("Restored wishlist {} from version {}", id, handle);
        Ok(wishlist)
    }

    // ==================== Trash Operations ====================

    /// Move a wishlist to the trash, returning the trash handle
    pub fn soft_delete(&self, id: &WishlistId) -> VaultResult<String> {
        let _guard = self.locks.lock(id.as_str());
        self.trash
            .move_in(id)?
            .ok_or_else(|| VaultError::WishlistNotFound(id.clone()))
    }

    /// Trash entries, most recently deleted first
    pub fn list_trash(&self) -> VaultResult<Vec<TrashEntry>> {
        Ok(self.trash.list()?)
    }

    /// Bring a trashed wishlist back
    ///
    /// If its id is taken by an active wishlist it is restored under a new
    /// id; the active wishlist is left alone.
    pub fn restore_from_trash(&self, handle: &str) -> VaultResult<Wishlist> {
        let _entry_guard = self.locks.lock(&trash_key(handle));
        let mut wishlist = self.trash.read(handle)?;

        let original = wishlist.id.clone();
        let _id_guard = self.locks.lock(original.as_str());
        let _fresh_guard = if self.is_active(&original) {
            let (fresh, guard) = self.claim_fresh_id()?;
            warn!(
                "Wishlist {} is active, restoring {} as {}",
                original, handle, fresh
            );
            wishlist.id = fresh;
            Some(guard)
        } else {
            None
        };

        wishlist.touch();
        self.trash.commit_restore(handle, &wishlist)?;
        Ok(wishlist)
    }

    /// Permanently delete a trash entry
    pub fn purge_forever(&self, handle: &str) -> VaultResult<()> {
        let _guard = self.locks.lock(&trash_key(handle));
        self.trash.purge(handle)
    }

    // ==================== Stats ====================

    /// File counts per namespace
    pub fn stats(&self) -> VaultResult<StoreStats> {
        let mut versions = 0;
        for owner in self.backend.version_owners()? {
            versions += self.backend.list(&Namespace::Versions(owner))?.len();
        }

        Ok(StoreStats {
            wishlists: self.backend.list(&Namespace::Active)?.len(),
            trashed: self.trash.count()?,
            versions,
        })
    }

    // ==================== Internals ====================

    /// Load, change, snapshot and persist a wishlist under its lock
    ///
    /// `change` runs on the in-memory copy; if it fails nothing is written.
    fn mutate<T>(
        &self,
        id: &WishlistId,
        change: impl FnOnce(&mut Wishlist) -> VaultResult<T>,
    ) -> VaultResult<(Wishlist, T)> {
        let _guard = self.locks.lock(id.as_str());

        let mut wishlist = self.load(id)?;
        let out = change(&mut wishlist)?;

        let _saving = self.saving.read();
        self.versions.snapshot_if_exists(id)?;
        wishlist.id = id.clone();
        wishlist.touch();
        self.persist(&wishlist)?;
        Ok((wishlist, out))
    }

    fn load(&self, id: &WishlistId) -> VaultResult<Wishlist> {
        let name = active_file_name(id);
        let bytes = self
            .backend
            .read(&Namespace::Active, &name)?
            .ok_or_else(|| VaultError::WishlistNotFound(id.clone()))?;
        Ok(storage::decode(
            &bytes,
            &self.backend.path(&Namespace::Active, &name),
        )?)
    }

    fn persist(&self, wishlist: &Wishlist) -> VaultResult<()> {
        self.backend.write(
            &Namespace::Active,
            &active_file_name(&wishlist.id),
            &storage::encode(wishlist)?,
        )?;
        Ok(())
    }

    fn is_active(&self, id: &WishlistId) -> bool {
        self.backend.exists(&Namespace::Active, &active_file_name(id))
    }

    /// An id with neither an active file nor a version history
    fn is_unused(&self, id: &WishlistId) -> bool {
        !self.is_active(id) && !self.backend.dir(&Namespace::Versions(id.clone())).exists()
    }

    /// Generate an unused wishlist id and lock it
    ///
    /// Generated ids are only probably unique, so each one is checked
    /// under its lock before use.
    fn claim_fresh_id(&self) -> VaultResult<(WishlistId, KeyGuard<'_>)> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = match WishlistId::parse(self.ids.generate()) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Discarding generated id: {}", e);
                    continue;
                }
            };

            // A held key is in use by a concurrent operation, possibly our own
            if let Some(guard) = self.locks.try_lock(id.as_str()) {
                if self.is_unused(&id) {
                    return Ok((id, guard));
                }
            }
            warn!("Generated id {} is in use, redrawing (attempt {})", id, attempt);
        }

        Err(VaultError::IdSpaceExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Generate an item id not used by `items`
    fn fresh_item_id(&self, items: &[Item]) -> VaultResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.ids.generate();
            if !candidate.is_empty() && !items.iter().any(|i| i.id == candidate) {
                return Ok(candidate);
            }
            warn!("Generated item id {:?} is in use, redrawing", candidate);
        }

        Err(VaultError::IdSpaceExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Validate items supplied on create
    ///
    /// Text must not be blank and ids must be unique; missing ids are
    /// generated and links normalized.
    fn prepare_items(&self, items: Vec<Item>) -> VaultResult<Vec<Item>> {
        let mut prepared: Vec<Item> = Vec::with_capacity(items.len());

        for mut item in items {
            if item.text.trim().is_empty() {
                return Err(VaultError::InvalidArgument(
                    "item text must not be empty".to_string(),
                ));
            }
            if item.id.is_empty() {
                item.id = self.fresh_item_id(&prepared)?;
            } else if prepared.iter().any(|i| i.id == item.id) {
                return Err(VaultError::InvalidArgument(format!(
                    "duplicate item id '{}'",
                    item.id
                )));
            }
            if let Some(link) = item.link.take() {
                item.set_link(&link);
            }
            prepared.push(item);
        }

        Ok(prepared)
    }
}

fn trash_key(handle: &str) -> String {
    format!("trash/{}", handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Claim;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    fn open(temp_dir: &TempDir) -> Store {
        Store::open_with_config(test_config(temp_dir)).unwrap()
    }

    fn id(s: &str) -> WishlistId {
        WishlistId::parse(s).unwrap()
    }

    /// Hands out a fixed sequence of ids, then falls back to random ones
    struct ScriptedIds(Mutex<VecDeque<String>>);

    impl ScriptedIds {
        fn new(ids: &[&str]) -> Box<Self> {
            Box::new(Self(Mutex::new(
                ids.iter().map(|s| s.to_string()).collect(),
            )))
        }
    }

    impl IdGenerator for ScriptedIds {
        fn generate(&self) -> String {
            self.0
                .lock()
                .pop_front()
                .unwrap_or_else(|| TimeRandomIds.generate())
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_store_is_send_sync() {
        assert_send_sync::<Store>();
    }

    #[test]
    fn test_open_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let _store = Store::open_with_config(config.clone()).unwrap();

        assert!(config.data_dir.join("versions").is_dir());
        assert!(config.data_dir.join("trash").is_dir());
    }

    #[test]
    fn test_create_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        assert!(temp_dir
            .path()
            .join(format!("{}.json", created.id))
            .exists());

        let loaded = store.get(&created.id).unwrap();
        assert_eq!(loaded, created);
        assert!(loaded.items.is_empty());
    }

    #[test]
    fn test_create_without_title_uses_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        let created = store.create(NewWishlist::default()).unwrap();
        assert_eq!(created.title, "New wishlist");

        let created = store.create(NewWishlist::titled("   ")).unwrap();
        assert_eq!(created.title, "New wishlist");
    }

    #[test]
    fn test_create_with_existing_id_snapshots_previous() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        store
            .create(NewWishlist::titled("First").with_id(id("gifts")))
            .unwrap();
        store
            .create(NewWishlist::titled("Second").with_id(id("gifts")))
            .unwrap();

        assert_eq!(store.get(&id("gifts")).unwrap().title, "Second");
        let versions = store.list_versions(&id("gifts")).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(
            store
                .get_version(&id("gifts"), &versions[0].handle)
                .unwrap()
                .title,
            "First"
        );
    }

    #[test]
    fn test_create_with_items() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        let items = vec![
            Item::new("", "Book", None),
            Item {
                link: Some("example.com".to_string()),
                ..Item::new("lamp", "Lamp", None)
            },
        ];
        let created = store
            .create(NewWishlist::titled("Gifts").with_items(items))
            .unwrap();

        assert_eq!(created.items.len(), 2);
        assert!(!created.items[0].id.is_empty());
        assert_eq!(created.items[1].id, "lamp");
        assert_eq!(created.items[1].link.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_create_rejects_bad_items() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        let dupes = vec![Item::new("a", "One", None), Item::new("a", "Two", None)];
        let err = store
            .create(NewWishlist::titled("Gifts").with_items(dupes))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let blank = vec![Item::new("a", "  ", None)];
        let err = store
            .create(NewWishlist::titled("Gifts").with_items(blank))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert!(store.list_summaries().unwrap().is_empty());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        let err = store.get(&id("nope")).unwrap_err();
        assert!(matches!(err, VaultError::WishlistNotFound(_)));
        assert_eq!(err.kind().http_status(), 404);
    }

    #[test]
    fn test_rename_title() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();

        let renamed = store.rename_title(&created.id, "Presents").unwrap();
        assert_eq!(renamed.title, "Presents");
        assert!(renamed.updated_at >= created.updated_at);
        assert_eq!(store.get(&created.id).unwrap().title, "Presents");
        assert_eq!(store.list_versions(&created.id).unwrap().len(), 1);

        let err = store.rename_title(&id("nope"), "x").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_append_item() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();

        let item = store
            .append_item(&created.id, "  Book  ", Some(" example.com/book "))
            .unwrap();
        assert_eq!(item.text, "Book");
        assert_eq!(item.claim, Claim::Free);
        assert_eq!(item.link.as_deref(), Some("https://example.com/book"));

        let loaded = store.get(&created.id).unwrap();
        assert_eq!(loaded.items, vec![item]);
    }

    #[test]
    fn test_append_blank_text_is_invalid_and_takes_no_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();

        let err = store.append_item(&created.id, "   ", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.kind().http_status(), 400);
        assert!(store.list_versions(&created.id).unwrap().is_empty());
    }

    #[test]
    fn test_append_to_missing_wishlist() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        let err = store.append_item(&id("nope"), "Book", None).unwrap_err();
        assert!(matches!(err, VaultError::WishlistNotFound(_)));
    }

    #[test]
    fn test_item_ids_redrawn_on_collision() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).with_id_generator(ScriptedIds::new(&[
            "list", "same", "same", "other",
        ]));
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        assert_eq!(created.id.as_str(), "list");

        let first = store.append_item(&created.id, "Book", None).unwrap();
        let second = store.append_item(&created.id, "Lamp", None).unwrap();
        assert_eq!(first.id, "same");
        assert_eq!(second.id, "other");
    }

    #[test]
    fn test_take_then_release_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        let item = store
            .append_item(&created.id, "Book", Some("example.com"))
            .unwrap();

        let taken = store
            .update_item(
                &created.id,
                &item.id,
                ItemPatch::default().take(Some("Ann".to_string())),
            )
            .unwrap();
        assert!(taken.is_taken());
        assert_eq!(taken.taken_by(), Some("Ann"));

        let released = store
            .update_item(&created.id, &item.id, ItemPatch::default().release())
            .unwrap();
        assert_eq!(released, item);

        let json = fs::read_to_string(temp_dir.path().join(format!("{}.json", created.id)))
            .unwrap();
        assert!(!json.contains("takenBy"));
        assert!(!json.contains("takenAt"));
    }

    #[test]
    fn test_take_without_name_and_retake() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        let item = store.append_item(&created.id, "Book", None).unwrap();

        let taken = store
            .update_item(&created.id, &item.id, ItemPatch::default().take(None))
            .unwrap();
        assert_eq!(taken.taken_by(), Some(""));

        let retaken = store
            .update_item(
                &created.id,
                &item.id,
                ItemPatch::default().take(Some("Bob".to_string())),
            )
            .unwrap();
        assert_eq!(retaken.taken_by(), Some("Bob"));
    }

    #[test]
    fn test_update_item_text_link_and_action_together() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        let item = store
            .append_item(&created.id, "Book", Some("example.com"))
            .unwrap();

        let updated = store
            .update_item(
                &created.id,
                &item.id,
                ItemPatch::default()
                    .text("")
                    .link("  ")
                    .take(Some("Ann".to_string())),
            )
            .unwrap();
        // Text is replaced verbatim, blank link clears the field
        assert_eq!(updated.text, "");
        assert!(updated.link.is_none());
        assert!(updated.is_taken());
    }

    #[test]
    fn test_update_missing_item() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();

        let err = store
            .update_item(&created.id, "nope", ItemPatch::default().release())
            .unwrap_err();
        assert!(matches!(err, VaultError::ItemNotFound { .. }));
        assert!(store.list_versions(&created.id).unwrap().is_empty());
    }

    #[test]
    fn test_remove_item() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        let book = store.append_item(&created.id, "Book", None).unwrap();
        let lamp = store.append_item(&created.id, "Lamp", None).unwrap();

        store.remove_item(&created.id, &book.id).unwrap();
        assert_eq!(store.get(&created.id).unwrap().items, vec![lamp]);

        let err = store.remove_item(&created.id, &book.id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_exactly_one_active_payload_after_mutations() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        let item = store.append_item(&created.id, "Book", None).unwrap();
        store.rename_title(&created.id, "Presents").unwrap();
        store
            .update_item(&created.id, &item.id, ItemPatch::default().text("Novel"))
            .unwrap();

        let active: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(store.stats().unwrap().wishlists, 1);
    }

    #[test]
    fn test_six_mutations_keep_newest_five_versions() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("rev 0")).unwrap();

        for i in 1..=6 {
            store.rename_title(&created.id, &format!("rev {}", i)).unwrap();
        }

        let versions = store.list_versions(&created.id).unwrap();
        assert_eq!(versions.len(), 5);
        let titles: Vec<_> = versions
            .iter()
            .map(|v| store.get_version(&created.id, &v.handle).unwrap().title)
            .collect();
        assert_eq!(titles, vec!["rev 5", "rev 4", "rev 3", "rev 2", "rev 1"]);
    }

    #[test]
    fn test_configured_retention() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            max_versions: 2,
            ..test_config(&temp_dir)
        };
        let store = Store::open_with_config(config).unwrap();
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();

        for i in 0..4 {
            store.rename_title(&created.id, &format!("rev {}", i)).unwrap();
        }
        assert_eq!(store.list_versions(&created.id).unwrap().len(), 2);
    }

    #[test]
    fn test_zero_retention_config_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            max_versions: 0,
            ..test_config(&temp_dir)
        };
        assert!(Store::open_with_config(config).is_err());
    }

    #[test]
    fn test_restore_version() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Original")).unwrap();
        store.rename_title(&created.id, "Changed").unwrap();

        let versions = store.list_versions(&created.id).unwrap();
        let restored = store
            .restore_version(&created.id, &versions[0].handle)
            .unwrap();
        assert_eq!(restored.title, "Original");
        assert_eq!(store.get(&created.id).unwrap().title, "Original");

        // "Changed" was snapshotted, the promoted version left the history
        let versions = store.list_versions(&created.id).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(
            store
                .get_version(&created.id, &versions[0].handle)
                .unwrap()
                .title,
            "Changed"
        );
    }

    #[test]
    fn test_restore_oldest_version_at_full_retention() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("rev 0")).unwrap();
        for i in 1..=5 {
            store.rename_title(&created.id, &format!("rev {}", i)).unwrap();
        }

        // Snapshotting "rev 5" prunes the oldest, which is the one restored
        let versions = store.list_versions(&created.id).unwrap();
        let oldest = versions.last().unwrap().handle.clone();
        let restored = store.restore_version(&created.id, &oldest).unwrap();

        assert_eq!(restored.title, "rev 0");
        assert_eq!(store.get(&created.id).unwrap().title, "rev 0");
        assert_eq!(store.list_versions(&created.id).unwrap().len(), 5);
    }

    #[test]
    fn test_restore_missing_version() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();

        let err = store
            .restore_version(&created.id, "gifts-2020-01-01T00-00-00-000000Z.json")
            .unwrap_err();
        assert!(matches!(err, VaultError::VersionNotFound { .. }));
        assert_eq!(store.get(&created.id).unwrap().title, "Gifts");
    }

    #[test]
    fn test_crash_between_snapshot_and_write_leaves_no_active() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        store.append_item(&created.id, "Book", None).unwrap();

        // The snapshot step ran, the write of the new state did not
        store.versions.snapshot_if_exists(&created.id).unwrap();

        assert!(store.get(&created.id).unwrap_err().is_not_found());
        let versions = store.list_versions(&created.id).unwrap();
        assert_eq!(versions.len(), 2);

        let recovered = store
            .restore_version(&created.id, &versions[0].handle)
            .unwrap();
        assert_eq!(recovered.items.len(), 1);
        assert_eq!(store.get(&created.id).unwrap().items[0].text, "Book");
    }

    #[test]
    fn test_list_summaries_ordering() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let a = store.create(NewWishlist::titled("A")).unwrap();
        let b = store.create(NewWishlist::titled("B")).unwrap();
        store.rename_title(&a.id, "A2").unwrap();

        let summaries = store.list_summaries().unwrap();
        let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), b.id.as_str()]);
        assert_eq!(summaries[0].title, "A2");
    }

    #[test]
    fn test_list_summaries_survives_corrupt_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        store.create(NewWishlist::titled("Gifts")).unwrap();
        fs::write(temp_dir.path().join("broken.json"), "not json at all").unwrap();

        let summaries = store.list_summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        let broken = summaries.iter().find(|s| s.id == "broken").unwrap();
        assert_eq!(broken.title, "broken");
        // Missing updatedAt sorts last
        assert_eq!(summaries[1].id, "broken");
    }

    #[test]
    fn test_soft_delete_and_purge() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        store.rename_title(&created.id, "Presents").unwrap();

        let handle = store.soft_delete(&created.id).unwrap();
        assert!(store.get(&created.id).unwrap_err().is_not_found());
        // History is kept for deleted wishlists
        assert_eq!(store.list_versions(&created.id).unwrap().len(), 1);

        let stats = store.stats().unwrap();
        assert_eq!(stats.wishlists, 0);
        assert_eq!(stats.trashed, 1);
        assert_eq!(stats.versions, 1);

        store.purge_forever(&handle).unwrap();
        assert!(store.list_trash().unwrap().is_empty());
        assert!(store.purge_forever(&handle).unwrap_err().is_not_found());
        assert!(store.restore_from_trash(&handle).unwrap_err().is_not_found());
    }

    #[test]
    fn test_soft_delete_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        let err = store.soft_delete(&id("nope")).unwrap_err();
        assert!(matches!(err, VaultError::WishlistNotFound(_)));
    }

    #[test]
    fn test_restore_from_trash_keeps_id_when_free() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        let handle = store.soft_delete(&created.id).unwrap();

        let restored = store.restore_from_trash(&handle).unwrap();
        assert_eq!(restored.id, created.id);
        assert!(restored.updated_at >= created.updated_at);
        assert!(store.list_trash().unwrap().is_empty());
        assert_eq!(store.get(&created.id).unwrap().title, "Gifts");

        // The entry is gone; a second restore cannot duplicate it
        assert!(matches!(
            store.restore_from_trash(&handle).unwrap_err(),
            VaultError::TrashEntryNotFound(_)
        ));
        assert_eq!(store.stats().unwrap().wishlists, 1);
    }

    #[test]
    fn test_restore_into_occupied_id_gets_new_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        store
            .create(NewWishlist::titled("Old gifts").with_id(id("gifts")))
            .unwrap();
        let handle = store.soft_delete(&id("gifts")).unwrap();
        let live = store
            .create(NewWishlist::titled("New gifts").with_id(id("gifts")))
            .unwrap();

        let restored = store.restore_from_trash(&handle).unwrap();
        assert_ne!(restored.id, live.id);
        assert_eq!(restored.title, "Old gifts");

        assert_eq!(store.get(&id("gifts")).unwrap(), live);
        assert_eq!(store.get(&restored.id).unwrap().title, "Old gifts");
    }

    #[test]
    fn test_generated_id_collision_is_redrawn() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).with_id_generator(ScriptedIds::new(&[
            "dup", "item-1", "dup", "fresh",
        ]));

        let first = store.create(NewWishlist::titled("First")).unwrap();
        assert_eq!(first.id.as_str(), "dup");
        store.append_item(&first.id, "Book", None).unwrap();

        // The generator repeats itself; the existing wishlist is untouched
        let second = store.create(NewWishlist::titled("Second")).unwrap();
        assert_eq!(second.id.as_str(), "fresh");
        assert_eq!(store.get(&id("dup")).unwrap().title, "First");
        assert_eq!(store.get(&id("dup")).unwrap().items.len(), 1);
    }

    #[test]
    fn test_restore_collision_redraws_generated_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).with_id_generator(ScriptedIds::new(&[
            "other", "gifts", "restored",
        ]));

        store
            .create(NewWishlist::titled("Trashed").with_id(id("gifts")))
            .unwrap();
        let handle = store.soft_delete(&id("gifts")).unwrap();
        store
            .create(NewWishlist::titled("Live").with_id(id("gifts")))
            .unwrap();
        store.create(NewWishlist::titled("Other")).unwrap();

        // "gifts" is active, so the generated "gifts" is rejected too
        let restored = store.restore_from_trash(&handle).unwrap();
        assert_eq!(restored.id.as_str(), "restored");
        assert_eq!(store.get(&id("gifts")).unwrap().title, "Live");
        assert_eq!(store.get(&id("other")).unwrap().title, "Other");
    }

    #[test]
    fn test_id_space_exhausted() {
        struct Stuck;
        impl IdGenerator for Stuck {
            fn generate(&self) -> String {
                "stuck".to_string()
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).with_id_generator(Box::new(Stuck));
        store.create(NewWishlist::titled("First")).unwrap();

        let err = store.create(NewWishlist::titled("Second")).unwrap_err();
        assert!(matches!(err, VaultError::IdSpaceExhausted { attempts: 16 }));
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
    }

    #[test]
    fn test_invalid_generated_ids_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir).with_id_generator(ScriptedIds::new(&["../evil", "", "ok"]));

        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        assert_eq!(created.id.as_str(), "ok");
    }

    #[test]
    fn test_full_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        let d = store.create(NewWishlist::titled("Gifts")).unwrap();
        let item = store.append_item(&d.id, "Book", None).unwrap();
        assert_eq!(item.claim, Claim::Free);
        assert!(item.link.is_none());

        let item = store
            .update_item(&d.id, &item.id, ItemPatch::default().link("amazon.com/x"))
            .unwrap();
        assert_eq!(item.link.as_deref(), Some("https://amazon.com/x"));

        let handle = store.soft_delete(&d.id).unwrap();
        assert!(matches!(
            store.get(&d.id).unwrap_err(),
            VaultError::WishlistNotFound(_)
        ));
        let trash = store.list_trash().unwrap();
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].title, "Gifts");
        assert_eq!(trash[0].handle, handle);

        let restored = store.restore_from_trash(&handle).unwrap();
        assert_eq!(restored.title, "Gifts");
        assert_eq!(restored.items, vec![item]);
        assert_eq!(store.get(&restored.id).unwrap(), restored);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(open(&temp_dir));
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                let id = created.id.clone();
                thread::spawn(move || {
                    for i in 0..10 {
                        store
                            .append_item(&id, &format!("item {}-{}", t, i), None)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let loaded = store.get(&created.id).unwrap();
        assert_eq!(loaded.items.len(), 80);
        assert_eq!(store.list_versions(&created.id).unwrap().len(), 5);
    }

    #[test]
    fn test_readers_never_miss_a_wishlist_being_saved() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(open(&temp_dir));
        let created = store.create(NewWishlist::titled("Gifts")).unwrap();
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            let id = created.id.clone();
            thread::spawn(move || {
                let (mut missing, mut unlisted) = (0, 0);
                while !done.load(Ordering::SeqCst) {
                    if store.get(&id).is_err() {
                        missing += 1;
                    }
                    if store.list_summaries().unwrap().is_empty() {
                        unlisted += 1;
                    }
                }
                (missing, unlisted)
            })
        };

        for i in 0..300 {
            store.rename_title(&created.id, &format!("Gifts {}", i)).unwrap();
        }
        done.store(true, Ordering::SeqCst);

        assert_eq!(reader.join().unwrap(), (0, 0));
    }

    #[test]
    fn test_reopen_sees_existing_data() {
        let temp_dir = TempDir::new().unwrap();
        let created = {
            let store = open(&temp_dir);
            let created = store.create(NewWishlist::titled("Gifts")).unwrap();
            store.append_item(&created.id, "Book", None).unwrap();
            created
        };

        let store = open(&temp_dir);
        assert_eq!(store.get(&created.id).unwrap().items.len(), 1);
    }
}
