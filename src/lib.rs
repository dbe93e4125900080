//! Plugdex - client-side plugin manager core
//!
//! Resolves which distribution of a plugin fits the running machine,
//! reconstructs which plugins are installed from the filesystem alone, and
//! plans the download target for an installation.

pub mod config;
pub mod error;
pub mod index;
pub mod installation;
pub mod pathutil;
pub mod platform;

pub use config::{Config, Paths};
pub use error::{PlugdexError, Result};
pub use index::{Platform, PluginManifest};
pub use installation::{get_download_target, list_installed_plugins, DownloadTarget};
pub use platform::{get_matching_platform, match_platform, SystemFacts};
