//! Manifest validation for Plugdex
//!
//! Checks catalog entries for the properties the rest of the crate relies
//! on: names that are safe to use as directory and link names, fingerprints
//! that can serve as version tokens, and platforms that carry everything the
//! download planner hands downstream.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PlugdexError, Result};

use super::types::{Platform, PluginManifest};

static SAFE_PLUGIN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("safe plugin name pattern"));

/// Returns true if `name` can be used as a path segment without escaping
/// its parent directory.
///
/// Accepted names are non-empty and made only of ASCII letters, digits,
/// `-` and `_`. This excludes path separators, `.`/`..` and hidden names.
pub fn is_safe_plugin_name(name: &str) -> bool {
    SAFE_PLUGIN_NAME.is_match(name)
}

/// Validate a plugin manifest for correctness and safety.
///
/// Performs the following checks:
/// - Plugin name passes [`is_safe_plugin_name`]
/// - Short description is non-empty
/// - At least one platform is defined, and each platform is valid
///   (see [`validate_platform`])
///
/// Selector syntax is not checked here; it is compiled (and rejected) at
/// resolution time.
pub fn validate_manifest(manifest: &PluginManifest) -> Result<()> {
    if !is_safe_plugin_name(&manifest.name) {
        return Err(PlugdexError::SecurityViolation(format!(
            "Invalid plugin name '{}': must be ASCII letters, digits, '-' or '_'",
            manifest.name
        )));
    }

    if manifest.short_description.trim().is_empty() {
        return Err(PlugdexError::Config(format!(
            "Plugin '{}' has an empty shortDescription",
            manifest.name
        )));
    }

    if manifest.platforms.is_empty() {
        return Err(PlugdexError::Config(format!(
            "Plugin '{}' must define at least one platform",
            manifest.name
        )));
    }

    for (i, platform) in manifest.platforms.iter().enumerate() {
        validate_platform(platform).map_err(|e| {
            PlugdexError::Config(format!(
                "Plugin '{}' platform #{}: {}",
                manifest.name, i, e
            ))
        })?;
    }

    Ok(())
}

/// Validate a single platform entry.
///
/// - `uri` must be non-empty
/// - `sha256` must be 64 hex digits (either case)
/// - `bin` must be a relative path that stays inside the install directory
/// - a selector must be present
/// - every file operation must have non-empty `from` and `to`
pub fn validate_platform(platform: &Platform) -> std::result::Result<(), String> {
    if platform.uri.trim().is_empty() {
        return Err("uri must not be empty".to_string());
    }

    match hex::decode(&platform.sha256) {
        Ok(bytes) if bytes.len() == 32 => {}
        _ => {
            return Err(format!(
                "sha256 '{}' is not a 64 character hex digest",
                platform.sha256
            ))
        }
    }

    let escapes = platform.bin.starts_with('/')
        || platform.bin.starts_with('\\')
        || platform.bin.split(['/', '\\']).any(|segment| segment == "..");
    if platform.bin.is_empty() || platform.bin == "." || escapes {
        return Err(format!(
            "bin '{}' must be a path inside the install directory",
            platform.bin
        ));
    }

    if platform.selector.is_none() {
        return Err("selector is required".to_string());
    }

    for op in &platform.files {
        if op.from.is_empty() || op.to.is_empty() {
            return Err("file operations need both 'from' and 'to'".to_string());
        }
    }

    Ok(())
}
