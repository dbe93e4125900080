//! Catalog loading for Plugdex
//!
//! The catalog is a directory of `{name}.json` manifest files. Loading the
//! whole catalog tolerates individual bad entries (they are logged and
//! skipped); loading a single plugin by name does not.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{PlugdexError, Result};

use super::types::PluginManifest;
use super::validation::{is_safe_plugin_name, validate_manifest};

/// Load every manifest in `index_dir`, sorted by plugin name.
///
/// Only regular files with a `.json` extension are considered. Manifests
/// that fail to parse or validate, or whose name differs from the file
/// stem, are skipped with a warning, so one broken catalog entry does not
/// hide the others.
///
/// # Errors
/// - `PlugdexError::Filesystem` if `index_dir` cannot be read
pub fn load_plugin_list_from_fs(index_dir: &Path) -> Result<Vec<PluginManifest>> {
    let entries = fs::read_dir(index_dir).map_err(|e| {
        PlugdexError::filesystem(
            format!("failed to read index directory {}", index_dir.display()),
            e,
        )
    })?;

    let mut plugins = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            PlugdexError::filesystem(
                format!("failed to read entry in {}", index_dir.display()),
                e,
            )
        })?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            warn!(file = %path.display(), "Manifest file name is not UTF-8, skipping");
            continue;
        };

        match read_manifest_file(&path, stem) {
            Ok(manifest) => {
                debug!(plugin = %manifest.name, "Loaded manifest");
                plugins.push(manifest);
            }
            Err(e) => {
                warn!(
                    file = %path.display(),
                    error = %e,
                    "Failed to load manifest, skipping"
                );
            }
        }
    }

    plugins.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(plugins)
}

/// Load a single plugin manifest by name.
///
/// The name is checked with [`is_safe_plugin_name`] before it is used to
/// build a path.
///
/// # Errors
/// - `PlugdexError::SecurityViolation` for unsafe names
/// - `PlugdexError::NotFound` if `{name}.json` does not exist
/// - `PlugdexError::Json` / `PlugdexError::Config` for malformed manifests
pub fn load_plugin_by_name(index_dir: &Path, name: &str) -> Result<PluginManifest> {
    if !is_safe_plugin_name(name) {
        return Err(PlugdexError::SecurityViolation(format!(
            "the plugin name '{}' is not allowed",
            name
        )));
    }

    let path = index_dir.join(format!("{}.json", name));
    if !path.is_file() {
        return Err(PlugdexError::NotFound(format!(
            "plugin '{}' is not in the index at {}",
            name,
            index_dir.display()
        )));
    }

    read_manifest_file(&path, name)
}

/// Parse and validate a manifest, requiring it to declare `expected_name`.
fn read_manifest_file(path: &Path, expected_name: &str) -> Result<PluginManifest> {
    let content = fs::read_to_string(path).map_err(|e| {
        PlugdexError::filesystem(format!("failed to read {}", path.display()), e)
    })?;

    let manifest: PluginManifest = serde_json::from_str(&content)?;
    validate_manifest(&manifest)?;

    if manifest.name != expected_name {
        return Err(PlugdexError::Config(format!(
            "{} declares plugin name '{}'",
            path.display(),
            manifest.name
        )));
    }
    Ok(manifest)
}
