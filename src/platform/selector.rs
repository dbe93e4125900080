//! Label selector compilation and matching.
//!
//! A [`LabelSelector`] from the catalog is compiled into a [`Selector`]: a
//! conjunction of requirements evaluated against [`SystemFacts`]. The
//! semantics mirror Kubernetes label selectors:
//!
//! - `matchLabels` entries are equality requirements
//! - `In` / `NotIn` need at least one value
//! - `Exists` / `DoesNotExist` take no values
//! - `NotIn` and `DoesNotExist` hold when the key is absent
//! - an empty selector matches everything, a missing one matches nothing

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::index::LabelSelector;

use super::facts::SystemFacts;

static LABEL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").expect("label name pattern")
});

static DNS_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("dns subdomain pattern")
});

const MAX_LABEL_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equals,
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl Operator {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "In" => Ok(Self::In),
            "NotIn" => Ok(Self::NotIn),
            "Exists" => Ok(Self::Exists),
            "DoesNotExist" => Ok(Self::DoesNotExist),
            other => Err(format!("'{}' is not a valid label selector operator", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Requirement {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

impl Requirement {
    fn new(key: &str, operator: Operator, values: &[String]) -> Result<Self, String> {
        validate_key(key)?;
        match operator {
            Operator::Equals if values.len() != 1 => {
                return Err(format!("equality on '{}' needs exactly one value", key));
            }
            Operator::In | Operator::NotIn if values.is_empty() => {
                return Err(format!(
                    "values for '{}' must be non-empty for set operators",
                    key
                ));
            }
            Operator::Exists | Operator::DoesNotExist if !values.is_empty() => {
                return Err(format!(
                    "values for '{}' must be empty for existence operators",
                    key
                ));
            }
            _ => {}
        }
        for value in values {
            validate_value(key, value)?;
        }

        Ok(Self {
            key: key.to_string(),
            operator,
            values: values.iter().cloned().collect(),
        })
    }

    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let actual = labels.get(&self.key);
        match self.operator {
            Operator::Equals | Operator::In => {
                actual.is_some_and(|value| self.values.contains(value))
            }
            Operator::NotIn => actual.map_or(true, |value| !self.values.contains(value)),
            Operator::Exists => actual.is_some(),
            Operator::DoesNotExist => actual.is_none(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<&str> = self.values.iter().map(String::as_str).collect();
        match self.operator {
            Operator::Equals => write!(f, "{}={}", self.key, values.join("")),
            Operator::In => write!(f, "{} in ({})", self.key, values.join(",")),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, values.join(",")),
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
        }
    }
}

/// A compiled selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<Requirement>,
    matches_nothing: bool,
}

impl Selector {
    /// Selector that matches every fact set.
    pub fn everything() -> Self {
        Self {
            requirements: Vec::new(),
            matches_nothing: false,
        }
    }

    /// Selector that matches no fact set.
    pub fn nothing() -> Self {
        Self {
            requirements: Vec::new(),
            matches_nothing: true,
        }
    }

    /// Compile a catalog selector.
    ///
    /// `None` compiles to [`Selector::nothing`]. Returns a description of the
    /// first problem found for malformed selectors.
    pub fn compile(selector: Option<&LabelSelector>) -> Result<Self, String> {
        let Some(selector) = selector else {
            return Ok(Self::nothing());
        };

        let mut requirements = Vec::new();
        for (key, value) in &selector.match_labels {
            requirements.push(Requirement::new(
                key,
                Operator::Equals,
                std::slice::from_ref(value),
            )?);
        }
        for expr in &selector.match_expressions {
            let operator = Operator::parse(&expr.operator)?;
            requirements.push(Requirement::new(&expr.key, operator, &expr.values)?);
        }

        Ok(Self {
            requirements,
            ..Self::everything()
        })
    }

    pub fn matches(&self, facts: &SystemFacts) -> bool {
        if self.matches_nothing {
            return false;
        }
        self.requirements
            .iter()
            .all(|requirement| requirement.matches(facts.labels()))
    }

    pub fn is_empty(&self) -> bool {
        !self.matches_nothing && self.requirements.is_empty()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches_nothing {
            return write!(f, "<none>");
        }
        let parts: Vec<String> = self.requirements.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

fn validate_key(key: &str) -> Result<(), String> {
    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN || !DNS_SUBDOMAIN.is_match(prefix) {
            return Err(format!("invalid label key '{}': bad prefix", key));
        }
    }

    if name.is_empty() || name.len() > MAX_LABEL_LEN || !LABEL_NAME.is_match(name) {
        return Err(format!("invalid label key '{}'", key));
    }

    Ok(())
}

fn validate_value(key: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    if value.len() > MAX_LABEL_LEN || !LABEL_NAME.is_match(value) {
        return Err(format!("invalid value '{}' for label '{}'", value, key));
    }
    Ok(())
}
