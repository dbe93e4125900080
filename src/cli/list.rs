//! List command: installed plugins and their version tokens.

use std::io;

use anyhow::{Context, Result};

use plugdex::installation::list_installed_plugins;

use super::load_paths;
use super::table::print_table;

pub(crate) fn cmd_list() -> Result<()> {
    let paths = load_paths()?;
    let installed = list_installed_plugins(paths.install_path(), paths.bin_path())
        .with_context(|| "Failed to load installed plugins")?;

    if installed.is_empty() {
        eprintln!("No plugins installed.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = installed
        .into_iter()
        .map(|(name, version)| vec![name, version])
        .collect();
    print_table(&mut io::stdout().lock(), &["PLUGIN", "VERSION"], &rows)?;
    Ok(())
}
