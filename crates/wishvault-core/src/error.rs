//! Engine errors
//!
//! Every store operation returns a [`VaultError`]. Its [`ErrorKind`] is what
//! an outer layer should branch on: not found, invalid argument, or storage
//! failure.

use thiserror::Error;

use crate::ids::{InvalidId, WishlistId};
use crate::storage::StorageError;

/// Coarse classification of a [`VaultError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    StorageFailure,
}

impl ErrorKind {
    /// HTTP status an API adapter should answer with
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidArgument => 400,
            ErrorKind::StorageFailure => 500,
        }
    }
}

/// Errors returned by [`crate::Store`] operations
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Wishlist not found: {0}")]
    WishlistNotFound(WishlistId),

    #[error("Item '{item_id}' not found in wishlist '{wishlist_id}'")]
    ItemNotFound {
        wishlist_id: WishlistId,
        item_id: String,
    },

    #[error("Version '{handle}' not found for wishlist '{wishlist_id}'")]
    VersionNotFound {
        wishlist_id: WishlistId,
        handle: String,
    },

    #[error("Trash entry not found: {0}")]
    TrashEntryNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The id generator kept producing ids that are already taken
    #[error("Could not generate an unused id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::WishlistNotFound(_)
            | VaultError::ItemNotFound { .. }
            | VaultError::VersionNotFound { .. }
            | VaultError::TrashEntryNotFound(_) => ErrorKind::NotFound,
            VaultError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            VaultError::IdSpaceExhausted { .. } | VaultError::Storage(_) => {
                ErrorKind::StorageFailure
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Recovery hint for storage failures
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            VaultError::Storage(e) => e.recovery_suggestion(),
            _ => None,
        }
    }
}

impl From<InvalidId> for VaultError {
    fn from(e: InvalidId) -> Self {
        VaultError::InvalidArgument(e.to_string())
    }
}

/// Result type for store operations
pub type VaultResult<T> = Result<T, VaultError>;
