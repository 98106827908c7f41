//! Version command handlers

use anyhow::Result;

use wishvault_core::Store;

use super::parse_id;
use crate::output::Output;

/// List stored versions of a wishlist
pub fn list(store: &Store, id: String, output: &Output) -> Result<()> {
    let versions = store.list_versions(&parse_id(&id)?)?;
    output.print_versions(&versions);
    Ok(())
}

/// Show a stored version without restoring it
pub fn show(store: &Store, id: String, handle: String, output: &Output) -> Result<()> {
    let wishlist = store.get_version(&parse_id(&id)?, &handle)?;
    output.print_wishlist(&wishlist);
    Ok(())
}

/// Restore a stored version as the current wishlist
pub fn restore(store: &Store, id: String, handle: String, output: &Output) -> Result<()> {
    let wishlist = store.restore_version(&parse_id(&id)?, &handle)?;
    output.success(&format!("Restored {} from {}", wishlist.id, handle));
    output.print_wishlist(&wishlist);
    Ok(())
}
