//! Search command: catalog entries with their status on this machine.

use std::collections::BTreeMap;
use std::fmt;
use std::io;

use anyhow::{Context, Result};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use plugdex::index::{load_plugin_list_from_fs, PluginManifest};
use plugdex::installation::list_installed_plugins_for;
use plugdex::platform::{match_platform, SystemFacts};

use super::load_paths;
use super::table::{limit_string, print_table};

const DESCRIPTION_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Installed,
    Available,
    Unavailable,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Installed => "installed",
            Status::Available => "available",
            Status::Unavailable => "unavailable",
        };
        write!(f, "{}", s)
    }
}

/// Installed wins over platform availability.
pub(crate) fn plugin_status(
    manifest: &PluginManifest,
    installed: &BTreeMap<String, String>,
    facts: &SystemFacts,
) -> plugdex::Result<Status> {
    if installed.contains_key(&manifest.name) {
        return Ok(Status::Installed);
    }
    Ok(match match_platform(manifest, facts)? {
        Some(_) => Status::Available,
        None => Status::Unavailable,
    })
}

/// Names matching `query` as a fuzzy subsequence. An empty query keeps all.
pub(crate) fn fuzzy_filter<'a>(query: &str, names: &[&'a str]) -> Vec<&'a str> {
    if query.is_empty() {
        return names.to_vec();
    }
    let matcher = SkimMatcherV2::default();
    names
        .iter()
        .copied()
        .filter(|name| matcher.fuzzy_match(name, query).is_some())
        .collect()
}

/// Rows of NAME / DESCRIPTION / STATUS, sorted by name.
pub(crate) fn search_rows(
    plugins: &[PluginManifest],
    installed: &BTreeMap<String, String>,
    facts: &SystemFacts,
    query: &str,
) -> plugdex::Result<Vec<Vec<String>>> {
    let by_name: BTreeMap<&str, &PluginManifest> =
        plugins.iter().map(|p| (p.name.as_str(), p)).collect();
    let names: Vec<&str> = by_name.keys().copied().collect();

    let mut rows = Vec::new();
    for name in fuzzy_filter(query, &names) {
        let manifest = by_name[name];
        let status = plugin_status(manifest, installed, facts)?;
        rows.push(vec![
            name.to_string(),
            limit_string(&manifest.short_description, DESCRIPTION_WIDTH),
            status.to_string(),
        ]);
    }
    rows.sort_by(|a, b| a[0].cmp(&b[0]));
    Ok(rows)
}

pub(crate) fn cmd_search(keywords: &[String]) -> Result<()> {
    let paths = load_paths()?;
    let facts = SystemFacts::detect();

    let plugins = load_plugin_list_from_fs(paths.index_path())
        .with_context(|| "Failed to load the index")?;
    let installed = list_installed_plugins_for(paths.install_path(), paths.bin_path(), &facts)
        .with_context(|| "Failed to load installed plugins")?;

    let rows = search_rows(&plugins, &installed, &facts, &keywords.join(""))
        .with_context(|| "Failed to resolve plugin platforms")?;
    if rows.is_empty() {
        return Ok(());
    }

    print_table(&mut io::stdout().lock(), &["NAME", "DESCRIPTION", "STATUS"], &rows)?;
    Ok(())
}
