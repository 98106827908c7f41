//! Data models for wishvault
//!
//! Defines the persisted wishlist document and its items, plus the summary
//! records returned by listings. The JSON shape uses camelCase keys, and
//! `takenBy`/`takenAt` only appear on taken items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::WishlistId;
use crate::link::normalize_link;

/// A wishlist document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    /// Stable identifier, assigned at creation
    pub id: WishlistId,
    /// Display title
    pub title: String,
    /// Items in display order
    #[serde(default)]
    pub items: Vec<Item>,
    /// When this wishlist was last mutated
    pub updated_at: DateTime<Utc>,
}

impl Wishlist {
    /// Create a wishlist with the given id and title
    pub fn new(id: WishlistId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Update the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Get a mutable item by ID
    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Remove an item, returning it if it was present
    pub fn remove_item(&mut self, item_id: &str) -> Option<Item> {
        let pos = self.items.iter().position(|i| i.id == item_id)?;
        let item = self.items.remove(pos);
        self.touch();
        Some(item)
    }
}

/// Claim state of an item
///
/// Serialized into the item itself as `"status": "free"` or
/// `"status": "taken"` with `takenBy`/`takenAt` alongside.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Claim {
    #[default]
    Free,
    Taken {
        #[serde(rename = "takenBy", default)]
        taken_by: String,
        #[serde(rename = "takenAt")]
        taken_at: DateTime<Utc>,
    },
}

/// One entry of a wishlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Unique within the parent wishlist
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub claim: Claim,
    /// Normalized URL, absent unless set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Item {
    /// Create a free item; `link` is normalized
    pub fn new(id: impl Into<String>, text: impl Into<String>, link: Option<&str>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            claim: Claim::Free,
            link: link.and_then(normalize_link),
        }
    }

    pub fn is_taken(&self) -> bool {
        matches!(self.claim, Claim::Taken { .. })
    }

    /// Who took the item, if it is taken
    pub fn taken_by(&self) -> Option<&str> {
        match &self.claim {
            Claim::Taken { taken_by, .. } => Some(taken_by),
            Claim::Free => None,
        }
    }

    /// Mark as taken. Re-taking overwrites the previous claim.
    pub fn take(&mut self, name: Option<String>) {
        self.claim = Claim::Taken {
            taken_by: name.unwrap_or_default(),
            taken_at: Utc::now(),
        };
    }

    /// Mark as free again
    pub fn release(&mut self) {
        self.claim = Claim::Free;
    }

    /// Set or clear the link; blank input clears it
    pub fn set_link(&mut self, raw: &str) {
        self.link = normalize_link(raw);
    }

    /// Apply a patch: text and link first, then the action
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(link) = patch.link {
            self.set_link(&link);
        }
        match patch.action {
            Some(ItemAction::Take { name }) => self.take(name),
            Some(ItemAction::Release) => self.release(),
            None => {}
        }
    }
}

/// Claim transition requested by an item update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    Take { name: Option<String> },
    Release,
}

/// Partial update of an item
///
/// `text` replaces the text verbatim (blank is allowed); `link` is
/// normalized and a blank value removes the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub text: Option<String>,
    pub link: Option<String>,
    pub action: Option<ItemAction>,
}

impl ItemPatch {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn take(mut self, name: Option<String>) -> Self {
        self.action = Some(ItemAction::Take { name });
        self
    }

    pub fn release(mut self) -> Self {
        self.action = Some(ItemAction::Release);
        self
    }
}

/// Input for creating (or overwriting) a wishlist
#[derive(Debug, Clone, Default)]
pub struct NewWishlist {
    /// Caller-chosen id; generated when absent
    pub id: Option<WishlistId>,
    /// Title; the configured default is used when absent or empty
    pub title: Option<String>,
    pub items: Vec<Item>,
}

impl NewWishlist {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: WishlistId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }
}

/// Listing row for an active wishlist
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WishlistSummary {
    /// File stem; a valid [`WishlistId`] unless the file was placed by hand
    pub id: String,
    /// Falls back to the id when the file is unreadable or untitled
    pub title: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Listing row for a stored version
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Opaque handle used to preview or restore the version
    pub handle: String,
    pub captured_at: DateTime<Utc>,
}

/// Listing row for a trashed wishlist
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrashEntry {
    /// Opaque handle used to restore or purge the entry
    pub handle: String,
    /// Original id; `None` when the payload is unreadable
    pub id: Option<WishlistId>,
    pub title: String,
    pub deleted_at: DateTime<Utc>,
}

/// File counts per namespace
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct StoreStats {
    pub wishlists: usize,
    pub trashed: usize,
    pub versions: usize,
}
