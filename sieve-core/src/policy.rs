//! The include/exclude verdict.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verdict for an item: keep it or drop it.
///
/// Used both as a classifier's default and as the tag of a per-item override.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
pub enum Policy {
    /// The item passes the classifier.
    #[default]
    Include,
    /// The item is filtered out.
    Exclude,
}

impl Policy {
    /// Returns `true` for [`Policy::Include`].
    #[inline]
    pub const fn is_include(self) -> bool {
        matches!(self, Policy::Include)
    }

    /// Returns `true` for [`Policy::Exclude`].
    #[inline]
    pub const fn is_exclude(self) -> bool {
        matches!(self, Policy::Exclude)
    }

    /// Returns the opposite verdict.
    #[inline]
    pub const fn inverse(self) -> Self {
        match self {
            Policy::Include => Policy::Exclude,
            Policy::Exclude => Policy::Include,
        }
    }

    /// Returns the policy name as a static string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Policy::Include => "include",
            Policy::Exclude => "exclude",
        }
    }
}

impl From<bool> for Policy {
    /// `true` maps to [`Policy::Include`], `false` to [`Policy::Exclude`].
    #[inline]
    fn from(include: bool) -> Self {
        if include {
            Policy::Include
        } else {
            Policy::Exclude
        }
    }
}

impl From<Policy> for bool {
    #[inline]
    fn from(policy: Policy) -> Self {
        policy.is_include()
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known policy name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown policy {0:?}, expected \"include\" or \"exclude\"")]
pub struct ParsePolicyError(String);

impl FromStr for Policy {
    type Err = ParsePolicyError;

    /// Parses `include` / `exclude`, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("include") {
            Ok(Policy::Include)
        } else if s.eq_ignore_ascii_case("exclude") {
            Ok(Policy::Exclude)
        } else {
            Err(ParsePolicyError(s.to_owned()))
        }
    }
}
