#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod classify;
pub mod eq;
pub mod error;
pub mod ext;
pub mod policy;

pub use classify::{BoxClassifier, Classify, ClassifyMut, ExplicitItems, Overrides};
pub use eq::observationally_eq;
pub use error::{ClassifierError, ClassifierResult};
pub use ext::ClassifyExt;
pub use policy::{ParsePolicyError, Policy};
