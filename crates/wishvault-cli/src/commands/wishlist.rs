//! Wishlist command handlers

use anyhow::Result;

use wishvault_core::{NewWishlist, Store};

use super::parse_id;
use crate::output::Output;

/// List active wishlists, most recently updated first
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let summaries = store.list_summaries()?;
    output.print_summaries(&summaries);
    Ok(())
}

/// Create a wishlist
pub fn create(
    store: &Store,
    title: Option<String>,
    id: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut new = NewWishlist {
        title,
        ..NewWishlist::default()
    };
    if let Some(ref id) = id {
        new = new.with_id(parse_id(id)?);
    }

    let wishlist = store.create(new)?;

    output.success(&format!("Created wishlist: {}", wishlist.id));
    output.print_wishlist(&wishlist);
    Ok(())
}

/// Show a wishlist with its items
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let wishlist = store.get(&parse_id(&id)?)?;
    output.print_wishlist(&wishlist);
    Ok(())
}

/// Change a wishlist's title
pub fn rename(store: &Store, id: String, title: String, output: &Output) -> Result<()> {
    let wishlist = store.rename_title(&parse_id(&id)?, &title)?;
    output.success(&format!("Renamed wishlist {} to \"{}\"", wishlist.id, wishlist.title));
    Ok(())
}

/// Move a wishlist to the trash
pub fn delete(store: &Store, id: String, output: &Output) -> Result<()> {
    let handle = store.soft_delete(&parse_id(&id)?)?;
    output.success(&format!("Moved {} to trash as {}", id, handle));
    Ok(())
}
