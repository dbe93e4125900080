//! Plugin catalog for Plugdex
//!
//! The catalog ("index") is a directory of JSON manifests, one per plugin.
//! Each manifest lists platform-specific distributions of a single binary.
//!
//! # Architecture
//!
//! - **types**: Manifest data structures (`PluginManifest`, `Platform`,
//!   `LabelSelector`, `FileOperation`)
//! - **validation**: Safe-name predicate and manifest checks
//! - **loader**: Reading the catalog directory
//!
//! # Index Directory Structure
//!
//! ```text
//! ~/.plugdex/index/
//! ├── ctx.json
//! ├── tree.json
//! └── whoami.json
//! ```

mod loader;
pub mod types;
mod validation;

pub use loader::{load_plugin_by_name, load_plugin_list_from_fs};
pub use types::{FileOperation, LabelSelector, LabelSelectorRequirement, Platform, PluginManifest};
pub use validation::{is_safe_plugin_name, validate_manifest, validate_platform};
