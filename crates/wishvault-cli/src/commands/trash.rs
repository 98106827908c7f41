//! Trash command handlers

use anyhow::Result;

use wishvault_core::Store;

use crate::output::Output;
use crate::prompt::confirm;

/// List trash entries, newest first
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let entries = store.list_trash()?;
    output.print_trash(&entries);
    Ok(())
}

/// Restore a trash entry
pub fn restore(store: &Store, handle: String, output: &Output) -> Result<()> {
    let wishlist = store.restore_from_trash(&handle)?;
    output.success(&format!("Restored {} as {}", handle, wishlist.id));
    output.print_wishlist(&wishlist);
    Ok(())
}

/// Permanently delete a trash entry
pub fn purge(store: &Store, handle: String, yes: bool, output: &Output) -> Result<()> {
    // Confirm deletion
    if !yes && output.should_prompt() {
        println!("Permanently delete {}? This cannot be undone.", handle);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.purge_forever(&handle)?;
    output.success(&format!("Purged {}", handle));
    Ok(())
}
