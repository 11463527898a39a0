#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod classifier;
pub mod concurrent;
pub mod config;
mod metrics;
pub mod read_only;

pub use classifier::Classifier;
pub use concurrent::ConcurrentClassifier;
pub use config::{ClassifierConfig, ConfigError};
pub use read_only::ReadOnlyClassifier;
pub use sieve_core::{
    BoxClassifier, ClassifierError, ClassifierResult, Classify, ClassifyExt, ClassifyMut,
    ExplicitItems, Overrides, ParsePolicyError, Policy, observationally_eq,
};

/// The `sieve` prelude.
pub mod prelude {
    pub use crate::{
        Classifier, Classify, ClassifyExt, ClassifyMut, ConcurrentClassifier, Policy,
        ReadOnlyClassifier,
    };
}
