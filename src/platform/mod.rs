//! Platform resolution for Plugdex
//!
//! Picks the distribution of a plugin that fits the running machine. The
//! machine is described by [`SystemFacts`]; each [`Platform`] in a manifest
//! carries a label selector over those facts. Platforms are tried in
//! declaration order and the first match wins, so overlapping selectors are
//! allowed and the catalog author controls precedence.
//!
//! Finding no match is not an error: it means the plugin is not offered for
//! this platform, and is reported as `Ok(None)`.

mod facts;
mod selector;

pub use facts::{native_arch, native_os, SystemFacts, ARCH_ENV, OS_ENV};
pub use selector::Selector;

use tracing::{debug, trace};

use crate::error::{PlugdexError, Result};
use crate::index::{Platform, PluginManifest};

/// Find the platform of `manifest` matching the current machine, honoring
/// the `PLUGDEX_OS` / `PLUGDEX_ARCH` overrides.
pub fn get_matching_platform(manifest: &PluginManifest) -> Result<Option<&Platform>> {
    let facts = SystemFacts::detect();
    debug!(os = facts.os(), arch = facts.arch(), "Using system facts");
    match_platform(manifest, &facts)
}

/// Find the first platform of `manifest` whose selector matches `facts`.
///
/// # Errors
/// `PlugdexError::InvalidSelector` as soon as a selector fails to compile;
/// later platforms are not considered.
pub fn match_platform<'a>(
    manifest: &'a PluginManifest,
    facts: &SystemFacts,
) -> Result<Option<&'a Platform>> {
    debug!(plugin = %manifest.name, facts = %facts, "Matching platform");

    for (i, platform) in manifest.platforms.iter().enumerate() {
        let selector = Selector::compile(platform.selector.as_ref()).map_err(|reason| {
            PlugdexError::InvalidSelector {
                plugin: manifest.name.clone(),
                reason: format!("platform #{}: {}", i, reason),
            }
        })?;

        if selector.matches(facts) {
            debug!(plugin = %manifest.name, index = i, "Found matching platform");
            return Ok(Some(platform));
        }
        trace!(plugin = %manifest.name, index = i, selector = %selector, "Platform does not match");
    }

    Ok(None)
}
