//! Configuration and directory layout for Plugdex
//!
//! All state lives under a single base directory, `~/.plugdex` unless
//! `PLUGDEX_ROOT` says otherwise:
//!
//! ```text
//! ~/.plugdex/
//! ├── config.json        optional, overrides the three directories below
//! ├── index/             catalog manifests ({name}.json)
//! ├── store/             install root: {name}/{version}/...
//! └── bin/               one link per installed plugin
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlugdexError, Result};

/// Environment variable overriding the base directory.
pub const ROOT_ENV: &str = "PLUGDEX_ROOT";

const CONFIG_FILE: &str = "config.json";
const DEFAULT_DIR_NAME: &str = ".plugdex";

/// Contents of `config.json`. Every field is optional; relative paths are
/// resolved against the base directory and a leading `~/` is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<String>,
}

impl Config {
    /// Base directory: `PLUGDEX_ROOT` when set and non-empty, else `~/.plugdex`.
    pub fn dir() -> PathBuf {
        base_dir_from(std::env::var(ROOT_ENV).ok())
    }

    /// Load `config.json` from the base directory, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::dir().join(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            PlugdexError::filesystem(format!("failed to read {}", path.display()), e)
        })?;
        serde_json::from_str(&content).map_err(|e| {
            PlugdexError::Config(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    /// Directory layout rooted at `base` with this config's overrides applied.
    pub fn paths(&self, base: &Path) -> Paths {
        let resolve = |value: &Option<String>, default: &str| match value {
            Some(dir) => resolve_dir(base, dir),
            None => base.join(default),
        };

        Paths {
            base: base.to_path_buf(),
            index: resolve(&self.index_dir, "index"),
            install: resolve(&self.install_dir, "store"),
            bin: resolve(&self.bin_dir, "bin"),
        }
    }
}

/// Resolved directory layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    base: PathBuf,
    index: PathBuf,
    install: PathBuf,
    bin: PathBuf,
}

impl Paths {
    /// Default layout under `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Config::default().paths(&base.into())
    }

    pub fn base_path(&self) -> &Path {
        &self.base
    }

    pub fn index_path(&self) -> &Path {
        &self.index
    }

    pub fn install_path(&self) -> &Path {
        &self.install
    }

    pub fn bin_path(&self) -> &Path {
        &self.bin
    }

    /// `{install}/{name}`
    pub fn plugin_install_path(&self, name: &str) -> PathBuf {
        self.install.join(name)
    }

    /// `{install}/{name}/{version}`
    pub fn plugin_version_install_path(&self, name: &str, version: &str) -> PathBuf {
        self.install.join(name).join(version)
    }

    /// Create the base, index, install and bin directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.base, &self.index, &self.install, &self.bin] {
            fs::create_dir_all(dir).map_err(|e| {
                PlugdexError::filesystem(format!("failed to create {}", dir.display()), e)
            })?;
        }
        Ok(())
    }
}

fn base_dir_from(root_override: Option<String>) -> PathBuf {
    match root_override.filter(|value| !value.is_empty()) {
        Some(root) => PathBuf::from(root),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME),
    }
}

fn resolve_dir(base: &Path, value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    base.join(value)
}
