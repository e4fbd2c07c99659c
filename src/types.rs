//! Shared data types for environments, release tags and deployment targets.
use chrono::{DateTime, TimeZone};
use regex::Regex;
use std::fmt;

use crate::{DeployError, Result};

/// Deployment environment, selected once per run by the `--production` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn from_production_flag(production: bool) -> Self {
        if production {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Label embedded in release tags for this environment.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Production => "PROD",
            Self::Development => "dev",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

/// A release tag of the form `<prefix>-<ENV>-<DD>-<MM>-<YYYY>-<H>-<M>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub name: String,
}

impl ReleaseTag {
    /// Builds the tag for a release started at `when`. Day and month are
    /// zero-padded, hour and minute are not.
    pub fn at<Tz: TimeZone>(
        prefix: &str,
        env: Environment,
        when: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let stamp = when.format("%d-%m-%Y-%-H-%-M");
        Self {
            name: format!("{}-{}", env_tag_prefix(prefix, env), stamp),
        }
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Prefix shared by every release tag of one environment, e.g. `BE-dev`.
pub fn env_tag_prefix(prefix: &str, env: Environment) -> String {
    format!("{}-{}", prefix, env.label())
}

/// Matches release tag names belonging to a single environment.
pub struct EnvTagMatcher {
    regex: Regex,
}

impl EnvTagMatcher {
    pub fn new(prefix: &str, env: Environment) -> Result<Self> {
        let pattern = format!(
            r"^{}-\d{{2}}-\d{{2}}-\d{{4}}-\d{{1,2}}-\d{{1,2}}$",
            regex::escape(&env_tag_prefix(prefix, env))
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn is_match(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }
}

/// The two newest release tags of an environment, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub newest: String,
    pub previous: String,
}

impl TagPair {
    /// Picks the two newest tags accepted by `matcher` from a
    /// creation-ordered (oldest first) tag list.
    pub fn latest(tags: &[String], matcher: &EnvTagMatcher) -> Option<Self> {
        let mut matching = tags.iter().rev().filter(|t| matcher.is_match(t));
        let newest = matching.next()?.clone();
        let previous = matching.next()?.clone();
        Some(Self { newest, previous })
    }
}

/// Snapshot of the working tree taken once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryStatus {
    pub branch: String,
    pub is_clean: bool,
}

/// Where the packaged code is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub region: String,
    pub function_name: String,
}

impl DeploymentTarget {
    /// Fails when no function name was given, since the upload could
    /// never succeed.
    pub fn new(region: String, function_name: Option<String>) -> Result<Self> {
        match function_name {
            Some(function_name) if !function_name.trim().is_empty() => {
                Ok(Self {
                    region,
                    function_name,
                })
            }
            _ => Err(DeployError::InvalidArgs(
                "a function name is required".into(),
            )),
        }
    }
}
