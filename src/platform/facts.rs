//! System facts: the label set describing the machine plugins resolve for.

use std::collections::BTreeMap;
use std::fmt;

/// Environment variable overriding the `os` fact.
pub const OS_ENV: &str = "PLUGDEX_OS";

/// Environment variable overriding the `arch` fact.
pub const ARCH_ENV: &str = "PLUGDEX_ARCH";

/// Key/value facts about the (possibly impersonated) running machine.
///
/// `os` and `arch` are always present. Values follow the catalog naming
/// convention (`darwin` rather than `macos`, `amd64` rather than `x86_64`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemFacts {
    labels: BTreeMap<String, String>,
}

impl SystemFacts {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert("os".to_string(), os.into());
        labels.insert("arch".to_string(), arch.into());
        Self { labels }
    }

    /// Facts of the machine this binary was compiled for, ignoring overrides.
    pub fn native() -> Self {
        Self::new(native_os(), native_arch())
    }

    /// Facts for the current process: native values unless `PLUGDEX_OS` /
    /// `PLUGDEX_ARCH` are set to non-empty values.
    pub fn detect() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`detect`](Self::detect) but reading overrides through `lookup`.
    /// Each override applies independently; empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let os = lookup(OS_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| native_os().to_string());
        let arch = lookup(ARCH_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| native_arch().to_string());
        Self::new(os, arch)
    }

    /// Add or replace an arbitrary fact.
    pub fn with_fact(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn os(&self) -> &str {
        self.get("os").unwrap_or_default()
    }

    pub fn arch(&self) -> &str {
        self.get("arch").unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Whether link names need the Windows executable suffix.
    pub fn is_windows(&self) -> bool {
        self.os() == "windows"
    }
}

impl fmt::Display for SystemFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .labels
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        write!(f, "{}", pairs.join(","))
    }
}

/// Native OS name in catalog convention.
pub fn native_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Native architecture name in catalog convention.
pub fn native_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}
