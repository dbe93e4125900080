//! Catalog types for Plugdex
//!
//! This module defines the manifest structures parsed from catalog files:
//! the plugin itself, its platform-specific distributions, the label
//! selectors that pick a distribution, and the file operations handed to
//! the downstream unpacker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A plugin manifest loaded from a `{name}.json` catalog file.
///
/// Manifests are immutable once loaded. The `platforms` list is ordered:
/// when more than one selector matches the running machine, the earliest
/// entry wins.
///
/// # Example
///
/// ```json
/// {
///   "name": "tree",
///   "version": "v0.4.0",
///   "shortDescription": "Show a tree of object hierarchies",
///   "description": "Prints ownership trees of related objects.",
///   "platforms": [
///     {
///       "selector": { "matchLabels": { "os": "linux", "arch": "amd64" } },
///       "uri": "https://example.com/tree_linux_amd64.tar.gz",
///       "sha256": "0f3b2c…",
///       "bin": "tree",
///       "files": [{ "from": "tree", "to": "." }]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    /// Plugin name. Used as a directory and link name, so it must pass
    /// [`is_safe_plugin_name`](super::is_safe_plugin_name).
    pub name: String,

    /// Human-facing release label. Informational only; the installed
    /// version token is the selected platform's `sha256`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// One-line description shown in search results.
    pub short_description: String,

    #[serde(default)]
    pub description: String,

    /// Notes printed after installation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caveats: Option<String>,

    /// Platform-specific distributions, evaluated in order.
    pub platforms: Vec<Platform>,
}

/// One distribution of a plugin for a class of machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// Constraints over system facts. A missing selector matches nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,

    /// Source location of the archive.
    pub uri: String,

    /// Content fingerprint of the archive, also used as the version token.
    pub sha256: String,

    /// Name of the executable once the archive is unpacked.
    pub bin: String,

    /// Archive-relative to install-relative copy instructions.
    #[serde(default)]
    pub files: Vec<FileOperation>,
}

/// Maps a path inside the unpacked archive to a path inside the install
/// directory. Passed through untouched to the unpacker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOperation {
    pub from: String,
    pub to: String,
}

/// A set of label constraints, in the shape of a Kubernetes `LabelSelector`.
///
/// All `match_labels` pairs and all `match_expressions` must hold for the
/// selector to match. An empty selector matches every fact set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

impl LabelSelector {
    /// Selector requiring exactly the given `os` and `arch`.
    pub fn os_arch(os: &str, arch: &str) -> Self {
        let mut match_labels = BTreeMap::new();
        match_labels.insert("os".to_string(), os.to_string());
        match_labels.insert("arch".to_string(), arch.to_string());
        Self {
            match_labels,
            match_expressions: Vec::new(),
        }
    }
}

/// A single set-based constraint such as `os In (linux, darwin)`.
///
/// The operator is kept as a raw string so that an unknown operator in a
/// catalog file surfaces as a selector compile error instead of a parse
/// failure of the whole manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}
