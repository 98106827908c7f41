//! Item command handlers

use anyhow::{bail, Result};

use wishvault_core::{ItemPatch, Store};

use super::parse_id;
use crate::output::Output;

/// Append an item to a wishlist
pub fn add(
    store: &Store,
    id: String,
    text: String,
    link: Option<String>,
    output: &Output,
) -> Result<()> {
    let item = store.append_item(&parse_id(&id)?, &text, link.as_deref())?;
    output.success(&format!("Added item: {}", item.id));
    output.print_item(&item);
    Ok(())
}

/// Change an item's text and/or link
///
/// An empty `--link ""` removes the link.
pub fn edit(
    store: &Store,
    id: String,
    item_id: String,
    text: Option<String>,
    link: Option<String>,
    output: &Output,
) -> Result<()> {
    if text.is_none() && link.is_none() {
        bail!("Nothing to change. Pass --text and/or --link.");
    }

    let patch = ItemPatch {
        text,
        link,
        action: None,
    };
    update(store, &id, &item_id, patch, "Updated", output)
}

/// Mark an item as taken
pub fn take(
    store: &Store,
    id: String,
    item_id: String,
    name: Option<String>,
    output: &Output,
) -> Result<()> {
    update(
        store,
        &id,
        &item_id,
        ItemPatch::default().take(name),
        "Took",
        output,
    )
}

/// Mark an item as free again
pub fn release(store: &Store, id: String, item_id: String, output: &Output) -> Result<()> {
    update(
        store,
        &id,
        &item_id,
        ItemPatch::default().release(),
        "Released",
        output,
    )
}

/// Remove an item from a wishlist
pub fn remove(store: &Store, id: String, item_id: String, output: &Output) -> Result<()> {
    store.remove_item(&parse_id(&id)?, &item_id)?;
    output.success(&format!("Removed item: {}", item_id));
    Ok(())
}

fn update(
    store: &Store,
    id: &str,
    item_id: &str,
    patch: ItemPatch,
    verb: &str,
    output: &Output,
) -> Result<()> {
    let item = store.update_item(&parse_id(id)?, item_id, patch)?;
    output.success(&format!("{} item: {}", verb, item.id));
    output.print_item(&item);
    Ok(())
}
