//! wishvault CLI
//!
//! Command-line interface for wishvault - versioned wishlists with trash.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use wishvault_core::{Config, Store};

mod commands;
mod logging;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "wishvault")]
#[command(about = "wishvault - Versioned wishlists with trash")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List wishlists, most recently updated first
    #[command(alias = "ls")]
    List,
    /// Create a wishlist
    Create {
        /// Title (the configured default title when omitted)
        title: Option<String>,
        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<String>,
    },
    /// Show a wishlist and its items
    Show {
        /// Wishlist ID
        id: String,
    },
    /// Change a wishlist's title
    Rename {
        /// Wishlist ID
        id: String,
        /// New title
        title: String,
    },
    /// Manage items of a wishlist
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Inspect and restore previous versions
    Versions {
        #[command(subcommand)]
        command: VersionCommands,
    },
    /// Move a wishlist to the trash
    #[command(alias = "rm")]
    Delete {
        /// Wishlist ID
        id: String,
    },
    /// Manage deleted wishlists
    Trash {
        #[command(subcommand)]
        command: TrashCommands,
    },
    /// Show storage statistics
    Stats,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Append an item
    Add {
        /// Wishlist ID
        id: String,
        /// Item text
        text: String,
        /// Link (https:// is added when no scheme is given)
        #[arg(short, long)]
        link: Option<String>,
    },
    /// Change an item's text or link
    Edit {
        /// Wishlist ID
        id: String,
        /// Item ID
        item: String,
        /// New text
        #[arg(short, long)]
        text: Option<String>,
        /// New link; empty removes it
        #[arg(short, long)]
        link: Option<String>,
    },
    /// Mark an item as taken
    Take {
        /// Wishlist ID
        id: String,
        /// Item ID
        item: String,
        /// Who is taking it
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Mark an item as free
    Release {
        /// Wishlist ID
        id: String,
        /// Item ID
        item: String,
    },
    /// Remove an item
    #[command(name = "rm", alias = "remove")]
    Remove {
        /// Wishlist ID
        id: String,
        /// Item ID
        item: String,
    },
}

#[derive(Subcommand)]
enum VersionCommands {
    /// List stored versions, newest first
    #[command(alias = "ls")]
    List {
        /// Wishlist ID
        id: String,
    },
    /// Show a stored version
    Show {
        /// Wishlist ID
        id: String,
        /// Version handle (from `versions list`)
        handle: String,
    },
    /// Make a stored version current again
    Restore {
        /// Wishlist ID
        id: String,
        /// Version handle (from `versions list`)
        handle: String,
    },
}

#[derive(Subcommand)]
enum TrashCommands {
    /// List deleted wishlists, newest first
    #[command(alias = "ls")]
    List,
    /// Restore a deleted wishlist
    Restore {
        /// Trash handle (from `trash list`)
        handle: String,
    },
    /// Permanently delete a trash entry
    Purge {
        /// Trash handle (from `trash list`)
        handle: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, max_versions, default_title, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config;

    // Config commands don't need the store
    if let Commands::Config { command } = cli.command {
        return handle_config_command(command, config_path.as_ref(), output);
    }

    let config = Config::load_with_cli_override(config_path.as_ref())?;
    logging::init(&config);
    let store = Store::open_with_config(config)?;

    match cli.command {
        Commands::List => commands::wishlist::list(&store, output),
        Commands::Create { title, id } => commands::wishlist::create(&store, title, id, output),
        Commands::Show { id } => commands::wishlist::show(&store, id, output),
        Commands::Rename { id, title } => commands::wishlist::rename(&store, id, title, output),
        Commands::Item { command } => handle_item_command(command, &store, output),
        Commands::Versions { command } => handle_version_command(command, &store, output),
        Commands::Delete { id } => commands::wishlist::delete(&store, id, output),
        Commands::Trash { command } => handle_trash_command(command, &store, output),
        Commands::Stats => commands::stats::show(&store, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_item_command(command: ItemCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        ItemCommands::Add { id, text, link } => commands::item::add(store, id, text, link, output),
        ItemCommands::Edit {
            id,
            item,
            text,
            link,
        } => commands::item::edit(store, id, item, text, link, output),
        ItemCommands::Take { id, item, name } => {
            commands::item::take(store, id, item, name, output)
        }
        ItemCommands::Release { id, item } => commands::item::release(store, id, item, output),
        ItemCommands::Remove { id, item } => commands::item::remove(store, id, item, output),
    }
}

fn handle_version_command(command: VersionCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        VersionCommands::List { id } => commands::version::list(store, id, output),
        VersionCommands::Show { id, handle } => commands::version::show(store, id, handle, output),
        VersionCommands::Restore { id, handle } => {
            commands::version::restore(store, id, handle, output)
        }
    }
}

fn handle_trash_command(command: TrashCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        TrashCommands::List => commands::trash::list(store, output),
        TrashCommands::Restore { handle } => commands::trash::restore(store, handle, output),
        TrashCommands::Purge { handle, yes } => commands::trash::purge(store, handle, yes, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
