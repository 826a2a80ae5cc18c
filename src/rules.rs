//! Config rules: `pattern[=name]` strings that expand one app directory into
//! its sdkconfig variants.
//!
//! A rule pattern may contain at most one `*` wildcard. When it does, the text
//! captured by the wildcard becomes the config name of every matching
//! fragment. A rule with an empty pattern (`=name`) is the default rule, used
//! only when no other rule matched anything.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const WILDCARD: char = '*';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Config rule '{0}' contains more than one wildcard")]
    MultipleWildcards(String),

    #[error("Config rule '{0}' is malformed, expected 'pattern[=name]'")]
    Malformed(String),

    #[error("Default config rule must name its config, use '=<name>'")]
    MissingDefaultName,
}

/// One `pattern[=name]` rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigRule {
    pub file_name_pattern: String,
    pub config_name: String,
}

impl ConfigRule {
    pub fn new(file_name_pattern: impl Into<String>, config_name: impl Into<String>) -> Self {
        Self {
            file_name_pattern: file_name_pattern.into(),
            config_name: config_name.into(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.file_name_pattern.is_empty()
    }

    pub fn has_wildcard(&self) -> bool {
        self.file_name_pattern.contains(WILDCARD)
    }

    /// Glob pattern equivalent of this rule, with every non-wildcard
    /// character matched literally.
    pub fn glob_pattern(&self) -> String {
        self.file_name_pattern
            .split(WILDCARD)
            .map(glob::Pattern::escape)
            .collect::<Vec<_>>()
            .join("*")
    }

    /// Config name for a fragment found by this rule.
    ///
    /// `relative_path` is the fragment path relative to the app directory,
    /// with `/` separators.
    pub fn config_name_for(&self, relative_path: &str) -> String {
        if !self.has_wildcard() {
            return self.config_name.clone();
        }

        glob_to_regex(&self.file_name_pattern)
            .ok()
            .and_then(|re| re.captures(relative_path))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for ConfigRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.file_name_pattern, self.config_name)
    }
}

impl std::str::FromStr for ConfigRule {
    type Err = RuleError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let mut parts = rule.split('=');
        let pattern = parts.next().unwrap_or_default();
        let name = parts.next();
        if parts.next().is_some() {
            return Err(RuleError::Malformed(rule.to_string()));
        }

        if pattern.matches(WILDCARD).count() > 1 {
            return Err(RuleError::MultipleWildcards(rule.to_string()));
        }

        if pattern.is_empty() && name.is_none() {
            return Err(RuleError::MissingDefaultName);
        }

        Ok(Self::new(pattern, name.unwrap_or_default()))
    }
}

/// Parses rule strings in order. Order is significant: every rule is
/// evaluated and contributes its own matches.
pub fn parse_rules<I, S>(rules: I) -> Result<Vec<ConfigRule>, RuleError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    rules.into_iter().map(|r| r.as_ref().parse()).collect()
}

/// Translates a single-wildcard glob into an anchored regex.
///
/// Literal segments are escaped and the wildcard becomes `(.*)`, so the
/// capture group holds whatever the wildcard matched.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split(WILDCARD)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("(.*)");

    Regex::new(&format!("^{}$", body))
}
