use std::fmt;
use std::str::FromStr;

use anyhow::{Error, anyhow};
use cucumber::World;
use sieve::config::{ClassifierConfig, ConfigError};
use sieve::{
    BoxClassifier, Classifier, ClassifierError, ClassifierResult, Classify, ClassifyMut,
    ConcurrentClassifier, Policy, ReadOnlyClassifier,
};

use crate::tracing::EventCollector;

/// Item type used by every scenario.
pub type Item = i64;

/// A classifier behind the mutable capability set.
pub type DynClassifier = BoxClassifier<Item>;

/// The classifier kind a scenario runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierKind {
    #[default]
    Sequential,
    Concurrent,
}

impl ClassifierKind {
    /// Creates an empty classifier of this kind.
    pub fn build(self, default: Policy) -> DynClassifier {
        match self {
            ClassifierKind::Sequential => Box::new(Classifier::<Item>::with_default(default)),
            ClassifierKind::Concurrent => {
                Box::new(ConcurrentClassifier::<Item>::with_default(default))
            }
        }
    }

    /// Builds a classifier of this kind from a YAML configuration.
    pub fn load(self, yaml: &str) -> Result<DynClassifier, ConfigError> {
        let config = ClassifierConfig::<Item>::from_yaml(yaml)?;
        Ok(match self {
            ClassifierKind::Sequential => Box::new(config.into_classifier()?),
            ClassifierKind::Concurrent => Box::new(config.into_concurrent()?),
        })
    }
}

impl FromStr for ClassifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(ClassifierKind::Sequential),
            "concurrent" => Ok(ClassifierKind::Concurrent),
            _ => Err(anyhow!("Unknown classifier kind: {}", s)),
        }
    }
}

/// Parses a comma separated item list such as `"2, 3, 4"`.
pub fn parse_items(list: &str) -> Result<Vec<Item>, Error> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse()
                .map_err(|e| anyhow!("Invalid item {:?}: {}", item, e))
        })
        .collect()
}

#[derive(World)]
#[world(init = Self::new)]
pub struct ClassifierWorld {
    pub kind: ClassifierKind,
    pub classifier: DynClassifier,
    /// Copy taken by the most recent clone step.
    pub copy: Option<DynClassifier>,
    /// Error returned by the most recent mutation, if it failed.
    pub last_error: Option<ClassifierError>,
    /// Value returned by the most recent `reset`.
    pub last_reset: Option<bool>,
    /// Error returned by the most recent configuration load.
    pub config_error: Option<ConfigError>,
    pub events: EventCollector,
}

impl ClassifierWorld {
    pub fn new() -> Self {
        let kind = ClassifierKind::default();
        Self {
            kind,
            classifier: kind.build(Policy::default()),
            copy: None,
            last_error: None,
            last_reset: None,
            config_error: None,
            events: EventCollector::default(),
        }
    }

    /// Replaces the classifier with an empty one.
    pub fn start(&mut self, kind: ClassifierKind, default: Policy) {
        self.kind = kind;
        self.classifier = kind.build(default);
        self.copy = None;
    }

    /// The copy taken by the last clone step.
    pub fn copy(&self) -> Result<&DynClassifier, Error> {
        self.copy
            .as_ref()
            .ok_or_else(|| anyhow!("The classifier was never cloned"))
    }

    /// Runs a mutation with event capture, recording a failure.
    pub fn mutate<R, F>(&mut self, f: F) -> Option<R>
    where
        F: FnOnce(&mut DynClassifier) -> ClassifierResult<R>,
    {
        let classifier = &mut self.classifier;
        match self.events.capture(|| f(classifier)) {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(error) => {
                self.last_error = Some(error);
                None
            }
        }
    }

    /// Wraps the current classifier in a read-only view.
    pub fn make_read_only(&mut self) {
        let inner = std::mem::replace(&mut self.classifier, self.kind.build(Policy::default()));
        self.classifier = Box::new(ReadOnlyClassifier::new(inner));
    }

    /// Builds a classifier of `kind` with the same default and overrides.
    pub fn rebuild_as(&self, kind: ClassifierKind) -> ClassifierResult<DynClassifier> {
        let mut other = kind.build(self.classifier.default_policy());
        for (item, policy) in self.classifier.overrides() {
            other.try_apply(item, policy)?;
        }
        Ok(other)
    }
}

impl Default for ClassifierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassifierWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierWorld")
            .field("kind", &self.kind)
            .field("default_policy", &self.classifier.default_policy())
            .field("override_count", &self.classifier.override_count())
            .field(
                "copy_override_count",
                &self.copy.as_ref().map(|copy| copy.override_count()),
            )
            .field("last_error", &self.last_error)
            .field("last_reset", &self.last_reset)
            .field("config_error", &self.config_error)
            .finish()
    }
}
