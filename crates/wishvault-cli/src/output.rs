//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use wishvault_core::{
    Item, StoreStats, TrashEntry, VaultError, VersionInfo, Wishlist, WishlistSummary,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a full wishlist with its items
    pub fn print_wishlist(&self, wishlist: &Wishlist) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", wishlist.id);
                println!("Title:    {}", wishlist.title);
                println!(
                    "Updated:  {}",
                    wishlist.updated_at.format("%Y-%m-%d %H:%M")
                );

                println!();
                if wishlist.items.is_empty() {
                    println!("No items.");
                    return;
                }
                println!("── Items ({}) ──", wishlist.items.len());
                for item in &wishlist.items {
                    println!("{}", item_line(item));
                }
            }
            OutputFormat::Json => print_json(wishlist),
            OutputFormat::Quiet => {
                println!("{}", wishlist.id);
            }
        }
    }

    /// Print a single item
    pub fn print_item(&self, item: &Item) {
        match self.format {
            OutputFormat::Human => println!("{}", item_line(item)),
            OutputFormat::Json => print_json(item),
            OutputFormat::Quiet => println!("{}", item.id),
        }
    }

    /// Print the list of active wishlists
    pub fn print_summaries(&self, summaries: &[WishlistSummary]) {
        match self.format {
            OutputFormat::Human => {
                if summaries.is_empty() {
                    println!("No wishlists found.");
                    return;
                }
                for summary in summaries {
                    let updated = summary
                        .updated_at
                        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".repeat(16));
                    println!(
                        "{} | {} | {}",
                        updated,
                        truncate(summary.id.as_str(), 20),
                        truncate(&summary.title, 45)
                    );
                }
                println!("\n{} wishlist(s)", summaries.len());
            }
            OutputFormat::Json => print_json(summaries),
            OutputFormat::Quiet => {
                for summary in summaries {
                    println!("{}", summary.id);
                }
            }
        }
    }

    /// Print the versions of one wishlist
    pub fn print_versions(&self, versions: &[VersionInfo]) {
        match self.format {
            OutputFormat::Human => {
                if versions.is_empty() {
                    println!("No versions stored.");
                    return;
                }
                for version in versions {
                    println!(
                        "{} | {}",
                        version.captured_at.format("%Y-%m-%d %H:%M:%S"),
                        version.handle
                    );
                }
                println!("\n{} version(s)", versions.len());
            }
            OutputFormat::Json => print_json(versions),
            OutputFormat::Quiet => {
                for version in versions {
                    println!("{}", version.handle);
                }
            }
        }
    }

    /// Print trash entries
    pub fn print_trash(&self, entries: &[TrashEntry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("Trash is empty.");
                    return;
                }
                for entry in entries {
                    println!(
                        "{} | {} | {}",
                        entry.deleted_at.format("%Y-%m-%d %H:%M"),
                        truncate(&entry.title, 35),
                        entry.handle
                    );
                }
                println!("\n{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
            }
            OutputFormat::Json => print_json(entries),
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.handle);
                }
            }
        }
    }

    /// Print namespace counts
    pub fn print_stats(&self, stats: &StoreStats, data_dir: &std::path::Path) {
        match self.format {
            OutputFormat::Human => {
                println!("wishvault Status");
                println!("================");
                println!();
                println!("Storage:");
                println!("  Location: {}", data_dir.display());
                println!();
                println!("Contents:");
                println!("  Wishlists: {}", stats.wishlists);
                println!("  Versions:  {}", stats.versions);
                println!("  Trash:     {}", stats.trashed);
            }
            OutputFormat::Json => print_json(&serde_json::json!({
                "data_dir": data_dir,
                "wishlists": stats.wishlists,
                "versions": stats.versions,
                "trashed": stats.trashed
            })),
            OutputFormat::Quiet => {
                println!("{} {} {}", stats.wishlists, stats.versions, stats.trashed);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a failed command to stderr, with a recovery hint when there is one
    pub fn error(&self, err: &anyhow::Error) {
        let vault_error = err.chain().find_map(|e| e.downcast_ref::<VaultError>());

        match self.format {
            OutputFormat::Json => {
                let status = vault_error.map(|e| e.kind().http_status()).unwrap_or(500);
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "status": "error",
                        "code": status,
                        "message": format!("{:#}", err)
                    })
                );
            }
            OutputFormat::Human | OutputFormat::Quiet => {
                eprintln!("Error: {:#}", err);
                if let Some(hint) = vault_error.and_then(|e| e.recovery_suggestion()) {
                    eprintln!("Hint: {}", hint);
                }
            }
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to encode JSON output: {}", e),
    }
}

/// One-line rendering of an item: claim box, id, text, link and claimant
fn item_line(item: &Item) -> String {
    let mut line = format!(
        "[{}] {} | {}",
        if item.is_taken() { "x" } else { " " },
        item.id,
        truncate(&item.text, 40)
    );
    if let Some(ref link) = item.link {
        line.push_str(&format!(" | {}", truncate(link, 45)));
    }
    match item.taken_by() {
        Some("") => line.push_str(" (taken)"),
        Some(name) => line.push_str(&format!(" (taken by {})", name)),
        None => {}
    }
    line
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Новый вишлист", 8), "Новый...");
    }

    #[test]
    fn test_item_line() {
        let mut item = Item::new("a1", "Book", Some("example.com"));
        assert_eq!(item_line(&item), "[ ] a1 | Book | https://example.com");

        item.take(Some("Ann".to_string()));
        assert_eq!(
            item_line(&item),
            "[x] a1 | Book | https://example.com (taken by Ann)"
        );

        item.take(None);
        assert!(item_line(&item).ends_with("(taken)"));
    }
}
