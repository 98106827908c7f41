//! Storage layer
//!
//! Byte-level file I/O over the active, versions and trash namespaces,
//! plus the JSON encoding of wishlists and the stamps used to name
//! snapshot and trash files.

pub mod backend;
pub mod error;
pub mod stamp;

use std::path::Path;

pub use backend::{active_file_name, Entry, FsBackend, Namespace};
pub use error::{StorageError, StorageResult};
pub use stamp::Stamp;

use crate::models::Wishlist;

/// Encode a wishlist as pretty-printed JSON
pub fn encode(wishlist: &Wishlist) -> StorageResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(wishlist)?)
}

/// Whether `handle` names a payload file directly inside a namespace
///
/// Handles come from callers, so anything that could address another
/// directory or a temp file is rejected.
pub fn valid_handle(handle: &str) -> bool {
    handle.len() > ".json".len()
        && handle.ends_with(".json")
        && !handle.starts_with('.')
        && !handle.contains(['/', '\\'])
        && !handle.chars().any(char::is_control)
}

/// Decode a wishlist read from `path`
pub fn decode(bytes: &[u8], path: &Path) -> StorageResult<Wishlist> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::CorruptDocument {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}
