//! Stats command handler

use anyhow::Result;

use wishvault_core::Store;

use crate::output::Output;

/// Show file counts per namespace
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let stats = store.stats()?;
    output.print_stats(&stats, &store.config().data_dir);
    Ok(())
}
