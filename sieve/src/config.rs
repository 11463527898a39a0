//! Declarative classifier configuration.
//!
//! A classifier can be described in YAML and built into either kind:
//!
//! ```yaml
//! default: Exclude
//! include: [2, 3, 4, 5]
//! exclude: [8, 9, 10]
//! ```
//!
//! ```
//! use sieve::config::ClassifierConfig;
//! use sieve::prelude::*;
//!
//! let config = ClassifierConfig::<u32>::from_yaml(
//!     "default: Exclude\ninclude: [2, 3]\nexclude: [8]\n",
//! )
//! .unwrap();
//!
//! let classifier = config.into_concurrent().unwrap();
//! assert!(classifier.should_include(&2));
//! assert!(!classifier.should_include(&8));
//! assert!(!classifier.should_include(&1));
//! ```

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sieve_core::Policy;
use thiserror::Error;
use tracing::debug;

use crate::{Classifier, ConcurrentClassifier};

/// Errors produced while loading a [`ClassifierConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid YAML or does not match the schema.
    #[error("Invalid classifier configuration: {0}")]
    Parse(#[from] serde_saphyr::Error),

    /// An item is listed under both `include` and `exclude`.
    #[error("Item {item} is listed as both included and excluded")]
    Conflict {
        /// Debug rendering of the conflicting item.
        item: String,
    },
}

/// Serializable description of a classifier.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClassifierConfig<T> {
    /// Policy for items not listed below.
    #[serde(default)]
    pub default: Policy,
    /// Items forced to [`Policy::Include`].
    #[serde(default = "Vec::new")]
    pub include: Vec<T>,
    /// Items forced to [`Policy::Exclude`].
    #[serde(default = "Vec::new")]
    pub exclude: Vec<T>,
}

impl<T> Default for ClassifierConfig<T> {
    fn default() -> Self {
        Self {
            default: Policy::default(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl<T> ClassifierConfig<T>
where
    T: Eq + Hash + Debug,
{
    /// Parses a configuration document.
    ///
    /// The document is only parsed; call [`validate`](Self::validate) or one
    /// of the `into_*` methods to check for conflicts.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError>
    where
        T: DeserializeOwned,
    {
        Ok(serde_saphyr::from_str(yaml)?)
    }

    /// Rejects items listed under both `include` and `exclude`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let included: HashSet<&T> = self.include.iter().collect();
        match self.exclude.iter().find(|item| included.contains(item)) {
            Some(item) => Err(ConfigError::Conflict {
                item: format!("{item:?}"),
            }),
            None => Ok(()),
        }
    }

    /// Builds a single-owner [`Classifier`].
    pub fn into_classifier(self) -> Result<Classifier<T>, ConfigError> {
        self.validate()?;
        debug!(
            default = %self.default,
            include = self.include.len(),
            exclude = self.exclude.len(),
            "building classifier from configuration"
        );
        let mut classifier =
            Classifier::with_capacity(self.default, self.include.len() + self.exclude.len());
        classifier
            .include_all(self.include)
            .exclude_all(self.exclude);
        Ok(classifier)
    }

    /// Builds a [`ConcurrentClassifier`].
    pub fn into_concurrent(self) -> Result<ConcurrentClassifier<T>, ConfigError> {
        self.validate()?;
        debug!(
            default = %self.default,
            include = self.include.len(),
            exclude = self.exclude.len(),
            "building concurrent classifier from configuration"
        );
        let classifier = ConcurrentClassifier::with_capacity(
            self.default,
            self.include.len() + self.exclude.len(),
        );
        classifier
            .include_all(self.include)
            .exclude_all(self.exclude);
        Ok(classifier)
    }
}

#[cfg(test)]
mod tests {
    use sieve_core::Classify;

    use super::*;

    #[test]
    fn test_deserialize_full() {
        let yaml = r#"
default: Exclude
include: [2, 3, 4, 5]
exclude:
  - 8
  - 9
  - 10
"#;

        let config = ClassifierConfig::<u32>::from_yaml(yaml).expect("failed to deserialize");

        assert_eq!(config.default, Policy::Exclude);
        assert_eq!(config.include, vec![2, 3, 4, 5]);
        assert_eq!(config.exclude, vec![8, 9, 10]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config =
            ClassifierConfig::<String>::from_yaml("include: [a]").expect("failed to deserialize");

        assert_eq!(config.default, Policy::Include);
        assert_eq!(config.include, vec!["a".to_owned()]);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_conflict_is_rejected() {
        let config = ClassifierConfig {
            default: Policy::Include,
            include: vec!["x", "y"],
            exclude: vec!["y"],
        };

        match config.into_classifier() {
            Err(ConfigError::Conflict { item }) => assert_eq!(item, "\"y\""),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_policy_is_parse_error() {
        let result = ClassifierConfig::<u32>::from_yaml("default: Sometimes");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_both_kinds_build_equal() {
        let config = ClassifierConfig {
            default: Policy::Exclude,
            include: vec![1, 2],
            exclude: vec![3],
        };

        let sequential = config.clone().into_classifier().unwrap();
        let concurrent = config.into_concurrent().unwrap();

        assert_eq!(sequential, concurrent);
        assert_eq!(sequential.override_count(), 3);
    }

    #[test]
    fn test_roundtrip_yaml() {
        let config = ClassifierConfig {
            default: Policy::Exclude,
            include: vec![1u16],
            exclude: vec![2u16],
        };

        let yaml = serde_saphyr::to_string(&config).expect("failed to serialize");
        let parsed = ClassifierConfig::<u16>::from_yaml(&yaml).expect("failed to deserialize");

        assert_eq!(parsed, config);
    }
}
