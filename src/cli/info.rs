//! Info and plan commands for a single plugin.

use anyhow::{Context, Result};

use plugdex::index::load_plugin_by_name;
use plugdex::installation::{find_installed_plugin_version, get_download_target_for};
use plugdex::platform::{match_platform, SystemFacts};

use super::load_paths;

pub(crate) fn cmd_info(name: &str) -> Result<()> {
    let paths = load_paths()?;
    let facts = SystemFacts::detect();
    let manifest = load_plugin_by_name(paths.index_path(), name)
        .with_context(|| format!("Failed to load plugin '{}'", name))?;

    println!("NAME: {}", manifest.name);
    if let Some(version) = &manifest.version {
        println!("VERSION: {}", version);
    }
    if let Some(homepage) = &manifest.homepage {
        println!("HOMEPAGE: {}", homepage);
    }
    println!("DESCRIPTION: {}", manifest.short_description);
    if !manifest.description.is_empty() {
        println!();
        println!("{}", manifest.description.trim_end());
        println!();
    }

    match match_platform(&manifest, &facts)? {
        Some(platform) => {
            println!("URI: {}", platform.uri);
            println!("SHA256: {}", platform.sha256);
        }
        None => println!("PLATFORM: not available for {}", facts),
    }

    let installed = find_installed_plugin_version(
        paths.install_path(),
        paths.bin_path(),
        &manifest.name,
        facts.is_windows(),
    )?;
    match installed {
        Some(version) => println!("INSTALLED: {}", version),
        None => println!("INSTALLED: no"),
    }

    if let Some(caveats) = &manifest.caveats {
        println!("CAVEATS:\n{}", caveats.trim_end());
    }
    Ok(())
}

pub(crate) fn cmd_plan(name: &str) -> Result<()> {
    let paths = load_paths()?;
    let facts = SystemFacts::detect();
    let manifest = load_plugin_by_name(paths.index_path(), name)
        .with_context(|| format!("Failed to load plugin '{}'", name))?;

    let target = get_download_target_for(&manifest, &facts)?;
    let plan = target.link_plan(&paths, &manifest.name, facts.is_windows());

    println!("VERSION: {}", target.version);
    println!("URI: {}", target.uri);
    println!("BIN: {}", target.bin);
    println!("INSTALL DIR: {}", plan.install_dir.display());
    println!("LINK: {} -> {}", plan.link.display(), plan.target.display());
    if !target.files.is_empty() {
        println!("FILES:");
        for op in &target.files {
            println!("  {} -> {}", op.from, op.to);
        }
    }
    Ok(())
}
