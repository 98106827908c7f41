//! wishvault Core Library
//!
//! This crate provides the storage engine for wishvault: wishlist
//! documents kept as JSON files, with a bounded version history per
//! wishlist and a trash for soft-deleted ones.
//!
//! # Layout
//!
//! ```text
//! <data_dir>/<id>.json                        active wishlist
//! <data_dir>/versions/<id>/<id>-<stamp>.json  snapshots, newest 5 kept
//! <data_dir>/trash/<id>-<stamp>.json          soft-deleted wishlists
//! ```
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open()?;
//!
//! let wishlist = store.create(NewWishlist::titled("Birthday"))?;
//! store.append_item(&wishlist.id, "Book", Some("example.com/book"))?;
//!
//! let handle = store.soft_delete(&wishlist.id)?;
//! let restored = store.restore_from_trash(&handle)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Wishlists, items and listing records
//! - `versions`: Snapshot retention
//! - `trash`: Soft delete, restore and purge
//! - `storage`: File backend, stamps and encoding
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod ids;
pub mod link;
pub mod listing;
pub mod locks;
pub mod models;
pub mod storage;
pub mod store;
pub mod trash;
pub mod versions;

pub use config::Config;
pub use error::{ErrorKind, VaultError, VaultResult};
pub use ids::{IdGenerator, InvalidId, TimeRandomIds, WishlistId};
pub use link::normalize_link;
pub use models::{
    Claim, Item, ItemAction, ItemPatch, NewWishlist, StoreStats, TrashEntry, VersionInfo,
    Wishlist, WishlistSummary,
};
pub use storage::{StorageError, StorageResult};
pub use store::Store;
