//! CLI command handlers.
//!
//! Presentation only: every decision is delegated to the library.

pub(crate) mod info;
pub(crate) mod list;
pub(crate) mod search;
mod table;

use anyhow::{Context, Result};

use plugdex::config::{Config, Paths};

/// Resolve the directory layout and make sure it exists.
pub(crate) fn load_paths() -> Result<Paths> {
    let config = Config::load().with_context(|| "Failed to load configuration")?;
    let paths = config.paths(&Config::dir());
    paths
        .ensure_dirs()
        .with_context(|| format!("Failed to prepare {}", paths.base_path().display()))?;
    Ok(paths)
}
