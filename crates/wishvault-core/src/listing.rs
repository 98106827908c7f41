//! Active wishlist listing
//!
//! Listing only needs the title and `updatedAt`, so files are read
//! loosely rather than decoded as full wishlists. A file that cannot be
//! read or parsed is still listed, titled by its id.
//!
//! A wishlist being saved is briefly missing from the active directory
//! (snapshot first, then write); callers keep saves out of the scan.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::ids::WishlistId;
use crate::models::WishlistSummary;
use crate::storage::{FsBackend, Namespace, StorageResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Summaries of all active wishlists, most recently updated first
///
/// Entries without a usable `updatedAt` sort last.
pub fn list_summaries(backend: &FsBackend) -> StorageResult<Vec<WishlistSummary>> {
    let mut summaries = Vec::new();

    for entry in backend.list(&Namespace::Active)? {
        let id = entry.stem().to_string();

        if let Err(e) = WishlistId::parse(id.as_str()) {
            warn!("Active file {} has an unusable id: {}", entry.name, e);
        }

        let fields = match peek(backend, &entry.name) {
            Ok(Some(fields)) => fields,
            Ok(None) => continue, // deleted since the directory was read
            Err(details) => {
                warn!("Unreadable wishlist {}: {}", entry.name, details);
                SummaryFields::default()
            }
        };

        let updated_at = fields.updated_at.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|at| at.with_timezone(&Utc))
                .ok()
        });

        summaries.push(WishlistSummary {
            title: fields
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| id.clone()),
            id,
            updated_at,
        });
    }

    summaries.sort_by_key(|s| Reverse(s.updated_at));
    Ok(summaries)
}

fn peek(backend: &FsBackend, name: &str) -> Result<Option<SummaryFields>, String> {
    let Some(bytes) = backend
        .read(&Namespace::Active, name)
        .map_err(|e| e.to_string())?
    else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| e.to_string())
}
