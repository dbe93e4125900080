//! Download-target planning
//!
//! Turns a manifest into the concrete artifact to fetch for this machine.
//! Planning is a pure read of the in-memory manifest.

use std::path::PathBuf;

use tracing::debug;

use crate::config::Paths;
use crate::error::{PlugdexError, Result};
use crate::index::{FileOperation, Platform, PluginManifest};
use crate::platform::{match_platform, SystemFacts};

use super::scanner::plugin_name_to_bin;

/// Everything the downloader, unpacker and linker need for one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Version token: the lowercased `sha256` of the selected platform.
    /// The scanner reads the same value back from the installed link.
    pub version: String,
    pub uri: String,
    pub files: Vec<FileOperation>,
    pub bin: String,
}

/// Where an artifact unpacks and how it gets linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    /// `{install}/{name}/{version}`
    pub install_dir: PathBuf,
    /// `{bin_dir}/{name}[.exe]`
    pub link: PathBuf,
    /// `{install}/{name}/{version}/{bin}`
    pub target: PathBuf,
}

impl DownloadTarget {
    pub fn from_platform(platform: &Platform) -> Self {
        Self {
            version: platform.sha256.to_lowercase(),
            uri: platform.uri.clone(),
            files: platform.files.clone(),
            bin: platform.bin.clone(),
        }
    }

    pub fn link_plan(&self, paths: &Paths, plugin_name: &str, windows: bool) -> LinkPlan {
        let install_dir = paths.plugin_version_install_path(plugin_name, &self.version);
        LinkPlan {
            link: paths.bin_path().join(plugin_name_to_bin(plugin_name, windows)),
            target: install_dir.join(&self.bin),
            install_dir,
        }
    }
}

/// Download target for the current (possibly overridden) platform.
pub fn get_download_target(manifest: &PluginManifest) -> Result<DownloadTarget> {
    get_download_target_for(manifest, &SystemFacts::detect())
}

/// Download target for `facts`.
///
/// # Errors
/// - `PlugdexError::InvalidSelector` if a selector fails to compile
/// - `PlugdexError::NotAvailable` if no platform matches
pub fn get_download_target_for(
    manifest: &PluginManifest,
    facts: &SystemFacts,
) -> Result<DownloadTarget> {
    let platform = match_platform(manifest, facts)?.ok_or_else(|| PlugdexError::NotAvailable {
        plugin: manifest.name.clone(),
        os: facts.os().to_string(),
        arch: facts.arch().to_string(),
    })?;

    let target = DownloadTarget::from_platform(platform);
    debug!(plugin = %manifest.name, version = %target.version, "Matching plugin version");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LabelSelector;
    use std::path::Path;

    fn manifest() -> PluginManifest {
        PluginManifest {
            name: "foo".to_string(),
            version: None,
            homepage: None,
            short_description: "Foo".to_string(),
            description: String::new(),
            caveats: None,
            platforms: vec![
                Platform {
                    selector: Some(LabelSelector::os_arch("linux", "amd64")),
                    uri: "https://example.com/U1".to_string(),
                    sha256: "H1".to_string(),
                    bin: "foo".to_string(),
                    files: vec![FileOperation {
                        from: "foo-linux/*".to_string(),
                        to: ".".to_string(),
                    }],
                },
                Platform {
                    selector: Some(LabelSelector::os_arch("windows", "amd64")),
                    uri: "https://example.com/U2".to_string(),
                    sha256: "H2".to_string(),
                    bin: "foo.exe".to_string(),
                    files: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_target_from_matching_platform() {
        let facts = SystemFacts::new("linux", "amd64");
        let target = get_download_target_for(&manifest(), &facts).unwrap();
        assert_eq!(target.version, "h1");
        assert_eq!(target.uri, "https://example.com/U1");
        assert_eq!(target.bin, "foo");
        assert_eq!(target.files, manifest().platforms[0].files);
    }

    #[test]
    fn test_no_platform_is_not_available() {
        let err =
            get_download_target_for(&manifest(), &SystemFacts::new("darwin", "arm64")).unwrap_err();
        match err {
            PlugdexError::NotAvailable { plugin, os, arch } => {
                assert_eq!(plugin, "foo");
                assert_eq!(os, "darwin");
                assert_eq!(arch, "arm64");
            }
            other => panic!("Expected NotAvailable, got {other:?}"),
        }
    }

    #[test]
    fn test_link_plan() {
        let paths = Paths::new("/base");
        let target =
            get_download_target_for(&manifest(), &SystemFacts::new("windows", "amd64")).unwrap();
        let plan = target.link_plan(&paths, "foo", true);

        assert_eq!(plan.install_dir, Path::new("/base/store/foo/h2"));
        assert_eq!(plan.link, Path::new("/base/bin/foo.exe"));
        assert_eq!(plan.target, Path::new("/base/store/foo/h2/foo.exe"));
    }
}
