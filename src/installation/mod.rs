//! Installation state for Plugdex
//!
//! - **scanner**: what is installed, reconstructed from the install root and
//!   the bin directory on every call
//! - **target**: what should be installed, as a resolved download target
//!
//! Callers diff the two. Downloading, unpacking, checksum verification and
//! creating or removing links happen downstream of this module.

mod scanner;
mod target;

pub use scanner::{
    find_installed_plugin_version, list_installed_plugins, list_installed_plugins_for,
    plugin_name_to_bin, plugin_version_from_path,
};
pub use target::{get_download_target, get_download_target_for, DownloadTarget, LinkPlan};
