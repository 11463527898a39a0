//! Error type for classifier operations.

use thiserror::Error;

/// Error returned by fallible classifier operations.
///
/// Plain classifiers never fail. The only failure is a mutation attempted
/// through a read-only view.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ClassifierError {
    /// A mutating operation was invoked on a read-only classifier.
    #[error("operation `{operation}` is not supported by a read-only classifier")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
    },
}

impl ClassifierError {
    /// Creates a [`ClassifierError::UnsupportedOperation`] for `operation`.
    #[inline]
    pub const fn unsupported(operation: &'static str) -> Self {
        Self::UnsupportedOperation { operation }
    }
}

/// Result alias for classifier operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;
