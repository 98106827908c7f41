//! Identifiers
//!
//! `WishlistId` names a wishlist and doubles as its file stem on disk, so it
//! is validated on construction. New ids come from an [`IdGenerator`]; the
//! store never trusts a generated id to be unique and re-checks it against
//! what already exists.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a string cannot be used as a wishlist id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid wishlist id '{id}': {reason}")]
pub struct InvalidId {
    pub id: String,
    pub reason: &'static str,
}

/// Stable identifier of a wishlist
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WishlistId(String);

impl WishlistId {
    /// Validate and wrap an id
    pub fn parse(id: impl Into<String>) -> Result<Self, InvalidId> {
        let id = id.into();
        let reason = if id.is_empty() {
            Some("must not be empty")
        } else if id.starts_with('.') {
            Some("must not start with '.'")
        } else if id.contains(['/', '\\']) {
            Some("must not contain path separators")
        } else if id.chars().any(char::is_control) {
            Some("must not contain control characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidId { id, reason }),
            None => Ok(Self(id)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WishlistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WishlistId {
    type Error = InvalidId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<WishlistId> for String {
    fn from(id: WishlistId) -> Self {
        id.0
    }
}

impl AsRef<str> for WishlistId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of fresh ids for wishlists and items
///
/// Ids are expected to be unique with overwhelming probability, not
/// guaranteed; callers check for collisions.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Default generator: base-36 epoch milliseconds plus a random suffix,
/// e.g. `mbx3k2a1-4f9q0z`
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeRandomIds;

impl IdGenerator for TimeRandomIds {
    fn generate(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u128;
        let random = Uuid::new_v4().as_u128();
        let suffix = to_base36(random);
        let suffix = &suffix[suffix.len().saturating_sub(6)..];
        format!("{}-{}", to_base36(millis), suffix)
    }
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
