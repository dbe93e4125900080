//! Installed-state scanner
//!
//! There is no database of installed plugins. A plugin counts as installed
//! when `{bin_dir}/{name}` is a symlink into `{install_dir}/{name}/{version}/`,
//! and the version token is read back from that link target. Every call
//! rescans the filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{PlugdexError, Result};
use crate::index::is_safe_plugin_name;
use crate::pathutil::{absolutize, clean_path, is_sub_path};
use crate::platform::SystemFacts;

/// File name of a plugin's link in the bin directory.
pub fn plugin_name_to_bin(name: &str, windows: bool) -> String {
    if windows {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// Map of installed plugin name to version token, using the link naming of
/// the current (possibly overridden) platform.
pub fn list_installed_plugins(
    install_dir: &Path,
    bin_dir: &Path,
) -> Result<BTreeMap<String, String>> {
    list_installed_plugins_for(install_dir, bin_dir, &SystemFacts::detect())
}

/// Map of installed plugin name to version token.
///
/// Each directory directly under `install_dir` is a candidate; other entries
/// are skipped. Candidates without a link are not installed and are left out.
///
/// # Errors
/// The first failure aborts the scan and no partial map is returned:
/// - `PlugdexError::Filesystem` if `install_dir` or a link cannot be read
/// - `PlugdexError::SecurityViolation` for a directory name that is not a
///   safe plugin name
/// - `PlugdexError::CorruptedState` for a link pointing outside
///   `{install_dir}/{name}/{version}/`
pub fn list_installed_plugins_for(
    install_dir: &Path,
    bin_dir: &Path,
    facts: &SystemFacts,
) -> Result<BTreeMap<String, String>> {
    let entries = fs::read_dir(install_dir).map_err(|e| {
        PlugdexError::filesystem(
            format!("failed to read install dir {}", install_dir.display()),
            e,
        )
    })?;
    debug!(install_dir = %install_dir.display(), "Scanning installation directory");

    let mut installed = BTreeMap::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(PlugdexError::filesystem(
                    format!("failed to read install dir {}", install_dir.display()),
                    e,
                ))
            }
        };

        // Removed between listing and inspection: treat as absent. A directory
        // removed after this point reaches the same outcome through the
        // missing link in `find_installed_plugin_version`.
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(entry = ?entry.file_name(), "Entry vanished during scan");
                continue;
            }
            Err(e) => {
                return Err(PlugdexError::filesystem(
                    format!("failed to stat {}", entry.path().display()),
                    e,
                ))
            }
        };

        if !file_type.is_dir() {
            trace!(entry = ?entry.file_name(), "Skipping non-directory item");
            continue;
        }

        let name = entry.file_name().into_string().map_err(|raw| {
            PlugdexError::SecurityViolation(format!("the plugin name {:?} is not allowed", raw))
        })?;

        if let Some(version) =
            find_installed_plugin_version(install_dir, bin_dir, &name, facts.is_windows())?
        {
            debug!(plugin = %name, version = %version, "Found installed plugin");
            installed.insert(name, version);
        }
    }

    Ok(installed)
}

/// Version token of an installed plugin, or `None` if it has no link.
///
/// The name is checked with `is_safe_plugin_name` before it is joined to
/// `bin_dir`. A relative link target is resolved against `bin_dir`.
pub fn find_installed_plugin_version(
    install_dir: &Path,
    bin_dir: &Path,
    plugin_name: &str,
    windows: bool,
) -> Result<Option<String>> {
    if !is_safe_plugin_name(plugin_name) {
        return Err(PlugdexError::SecurityViolation(format!(
            "the plugin name '{}' is not allowed",
            plugin_name
        )));
    }

    let link_path = bin_dir.join(plugin_name_to_bin(plugin_name, windows));
    trace!(plugin = plugin_name, link = %link_path.display(), "Reading plugin link");

    let link = match fs::read_link(&link_path) {
        Ok(link) => link,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PlugdexError::filesystem(
                format!(
                    "could not read link {} of plugin '{}'",
                    link_path.display(),
                    plugin_name
                ),
                e,
            ))
        }
    };

    let target = if link.is_absolute() {
        clean_path(&link)
    } else {
        absolutize(&bin_dir.join(&link)).map_err(|e| {
            PlugdexError::filesystem(
                format!(
                    "failed to get the absolute path for the link of plugin '{}'",
                    plugin_name
                ),
                e,
            )
        })?
    };

    plugin_version_from_path(install_dir, &target, plugin_name).map(Some)
}

/// Extracts `{version}` from `{install_dir}/{plugin_name}/{version}/...`.
pub fn plugin_version_from_path(
    install_dir: &Path,
    plugin_path: &Path,
    plugin_name: &str,
) -> Result<String> {
    let install_dir = absolutize(install_dir).map_err(|e| {
        PlugdexError::filesystem(
            format!("failed to resolve install dir {}", install_dir.display()),
            e,
        )
    })?;

    match is_sub_path(&install_dir, plugin_path) {
        Some(elems) if elems.len() >= 2 && elems[0] == plugin_name => Ok(elems[1].clone()),
        _ => Err(PlugdexError::CorruptedState(format!(
            "failed to get the version of plugin '{}' from link target {} with install path {}",
            plugin_name,
            plugin_path.display(),
            install_dir.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Layout {
        _tmp: TempDir,
        install: PathBuf,
        bin: PathBuf,
    }

    fn layout() -> Layout {
        let tmp = TempDir::new().unwrap();
        let install = tmp.path().join("store");
        let bin = tmp.path().join("bin");
        fs::create_dir_all(&install).unwrap();
        fs::create_dir_all(&bin).unwrap();
        Layout {
            _tmp: tmp,
            install,
            bin,
        }
    }

    fn linux() -> SystemFacts {
        SystemFacts::new("linux", "amd64")
    }

    #[test]
    fn test_plugin_name_to_bin() {
        assert_eq!(plugin_name_to_bin("foo", false), "foo");
        assert_eq!(plugin_name_to_bin("foo", true), "foo.exe");
    }

    #[test]
    fn test_plugin_version_from_path() {
        let version = plugin_version_from_path(
            Path::new("/x/store"),
            Path::new("/x/store/foo/abc123/bin/foo"),
            "foo",
        )
        .unwrap();
        assert_eq!(version, "abc123");
    }

    #[test]
    fn test_plugin_version_from_path_needs_two_segments() {
        let err =
            plugin_version_from_path(Path::new("/x/store"), Path::new("/x/store/foo"), "foo")
                .unwrap_err();
        assert!(matches!(err, PlugdexError::CorruptedState(_)));
    }

    #[test]
    fn test_plugin_version_from_path_outside_root() {
        let err = plugin_version_from_path(
            Path::new("/x/store"),
            Path::new("/usr/local/bin/foo"),
            "foo",
        )
        .unwrap_err();
        assert!(matches!(err, PlugdexError::CorruptedState(_)));
    }

    #[test]
    fn test_plugin_version_from_path_other_plugin_dir() {
        let err = plugin_version_from_path(
            Path::new("/x/store"),
            Path::new("/x/store/bar/v1/bar"),
            "foo",
        )
        .unwrap_err();
        assert!(err.to_string().contains("'foo'"));
    }

    #[test]
    fn test_empty_install_dir() {
        let l = layout();
        let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
        assert!(installed.is_empty());
    }

    #[test]
    fn test_missing_install_dir_is_error() {
        let l = layout();
        let err =
            list_installed_plugins_for(&l.install.join("nope"), &l.bin, &linux()).unwrap_err();
        assert!(matches!(err, PlugdexError::Filesystem { .. }));
    }

    #[test]
    fn test_directory_without_link_is_not_installed() {
        let l = layout();
        fs::create_dir_all(l.install.join("foo").join("abc123")).unwrap();
        let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
        assert!(installed.is_empty());
    }

    #[test]
    fn test_lookup_of_removed_plugin_is_absent() {
        let l = layout();
        fs::create_dir_all(l.install.join("gone").join("abc123")).unwrap();
        fs::remove_dir_all(l.install.join("gone")).unwrap();

        let version = find_installed_plugin_version(&l.install, &l.bin, "gone", false).unwrap();
        assert_eq!(version, None);
        let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
        assert!(installed.is_empty());
    }

    #[test]
    fn test_non_directory_entries_are_skipped() {
        let l = layout();
        fs::write(l.install.join("stray.txt"), "x").unwrap();
        fs::write(l.install.join(".lock"), "").unwrap();
        let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
        assert!(installed.is_empty());
    }

    #[test]
    fn test_unsafe_name_is_rejected_before_lookup() {
        let l = layout();
        let err = find_installed_plugin_version(&l.install, &l.bin, "../foo", false).unwrap_err();
        assert!(matches!(err, PlugdexError::SecurityViolation(_)));

        let err = find_installed_plugin_version(&l.install, &l.bin, "a/b", false).unwrap_err();
        assert!(matches!(err, PlugdexError::SecurityViolation(_)));
    }

    #[test]
    fn test_hidden_directory_aborts_scan() {
        let l = layout();
        fs::create_dir(l.install.join(".cache")).unwrap();
        let err = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap_err();
        assert!(matches!(err, PlugdexError::SecurityViolation(_)));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::symlink;

        fn install(l: &Layout, name: &str, version: &str) -> PathBuf {
            let dir = l.install.join(name).join(version);
            fs::create_dir_all(&dir).unwrap();
            let bin = dir.join(name);
            fs::write(&bin, "#!/bin/sh\n").unwrap();
            bin
        }

        #[test]
        fn test_unlinked_directory_is_skipped_among_installed() {
            let l = layout();
            symlink(install(&l, "foo", "abc123"), l.bin.join("foo")).unwrap();
            install(&l, "gone", "def456");

            let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
            assert_eq!(installed.len(), 1);
            assert_eq!(installed.get("foo").map(String::as_str), Some("abc123"));
            assert_eq!(
                find_installed_plugin_version(&l.install, &l.bin, "gone", false).unwrap(),
                None
            );
        }

        #[test]
        fn test_absolute_link_round_trip() {
            let l = layout();
            let target = install(&l, "foo", "abc123");
            symlink(&target, l.bin.join("foo")).unwrap();

            let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
            assert_eq!(installed.len(), 1);
            assert_eq!(installed.get("foo").map(String::as_str), Some("abc123"));

            fs::remove_file(l.bin.join("foo")).unwrap();
            let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
            assert!(installed.is_empty());
        }

        #[test]
        fn test_relative_link_resolves_against_bin_dir() {
            let l = layout();
            install(&l, "foo", "v2");
            symlink("../store/foo/v2/foo", l.bin.join("foo")).unwrap();

            let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
            assert_eq!(installed.get("foo").map(String::as_str), Some("v2"));
        }

        #[test]
        fn test_dangling_link_still_reports_version() {
            let l = layout();
            fs::create_dir_all(l.install.join("foo")).unwrap();
            symlink(l.install.join("foo/gone/foo"), l.bin.join("foo")).unwrap();

            let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
            assert_eq!(installed.get("foo").map(String::as_str), Some("gone"));
        }

        #[test]
        fn test_windows_facts_use_exe_suffix() {
            let l = layout();
            let target = install(&l, "foo", "abc123");
            symlink(&target, l.bin.join("foo")).unwrap();

            let windows = SystemFacts::new("windows", "amd64");
            let installed = list_installed_plugins_for(&l.install, &l.bin, &windows).unwrap();
            assert!(installed.is_empty());

            symlink(&target, l.bin.join("foo.exe")).unwrap();
            let installed = list_installed_plugins_for(&l.install, &l.bin, &windows).unwrap();
            assert_eq!(installed.get("foo").map(String::as_str), Some("abc123"));
        }

        #[test]
        fn test_link_outside_install_root_is_corrupted() {
            let l = layout();
            fs::create_dir_all(l.install.join("foo")).unwrap();
            symlink("/usr/bin/env", l.bin.join("foo")).unwrap();

            let err = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap_err();
            assert!(matches!(err, PlugdexError::CorruptedState(_)));
        }

        #[test]
        fn test_corrupted_entry_hides_healthy_ones() {
            let l = layout();
            let good = install(&l, "good", "v1");
            symlink(&good, l.bin.join("good")).unwrap();
            fs::create_dir_all(l.install.join("bad")).unwrap();
            symlink(l.install.join("bad"), l.bin.join("bad")).unwrap();

            assert!(list_installed_plugins_for(&l.install, &l.bin, &linux()).is_err());
        }

        #[test]
        fn test_regular_file_in_bin_dir_is_read_error() {
            let l = layout();
            fs::create_dir_all(l.install.join("foo")).unwrap();
            fs::write(l.bin.join("foo"), "not a link").unwrap();

            let err = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap_err();
            match err {
                PlugdexError::Filesystem { context, .. } => assert!(context.contains("'foo'")),
                other => panic!("Expected Filesystem error, got {other:?}"),
            }
        }

        #[test]
        fn test_symlinked_plugin_dir_is_skipped() {
            let l = layout();
            let real = install(&l, "real", "v1");
            symlink(&real, l.bin.join("real")).unwrap();
            symlink(l.install.join("real"), l.install.join("alias")).unwrap();

            let installed = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
            assert_eq!(installed.len(), 1);
            assert!(installed.contains_key("real"));
        }

        #[test]
        fn test_scan_is_idempotent() {
            let l = layout();
            for (name, version) in [("a", "1"), ("b", "2"), ("c", "3")] {
                let target = install(&l, name, version);
                symlink(&target, l.bin.join(name)).unwrap();
            }

            let first = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
            let second = list_installed_plugins_for(&l.install, &l.bin, &linux()).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.len(), 3);
        }
    }
}
