//! Lexical path helpers
//!
//! Link targets are compared against the install root without touching the
//! filesystem: symlinks are never followed and missing paths are fine. This
//! keeps decomposition stable when the install root itself sits behind a
//! symlink (e.g. `/tmp` on macOS).

use std::io;
use std::path::{Component, Path, PathBuf};

/// Removes `.` components and resolves `..` against preceding components.
///
/// `..` at the root is dropped, as `/..` is `/`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(component),
            },
            Component::CurDir => {}
            _ => cleaned.push(component),
        }
    }

    cleaned
}

/// Joins relative paths to the current directory, then cleans the result.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(clean_path(path));
    }
    Ok(clean_path(&std::env::current_dir()?.join(path)))
}

/// If `sub` lies at or below `base`, returns the segments that extend
/// `base` to reach it. Both paths are cleaned first and should be absolute.
pub fn is_sub_path(base: &Path, sub: &Path) -> Option<Vec<String>> {
    let base = clean_path(base);
    let sub = clean_path(sub);
    let rest = sub.strip_prefix(&base).ok()?;

    Some(
        rest.components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect(),
    )
}
