//! Command handlers

pub mod config;
pub mod item;
pub mod stats;
pub mod trash;
pub mod version;
pub mod wishlist;

use anyhow::Result;

use wishvault_core::WishlistId;

/// Parse a wishlist id given on the command line
pub fn parse_id(id: &str) -> Result<WishlistId> {
    Ok(WishlistId::parse(id)?)
}
