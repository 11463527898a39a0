//! Metrics declaration and recording.
//!
//! Counters are labelled with the classifier `kind` (`sequential`,
//! `concurrent`) so both variants can be told apart in one registry.
//! Without the `metrics` feature every recording function compiles to nothing.

use sieve_core::Policy;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of overrides written by include/exclude.
    pub static ref OVERRIDES_WRITTEN: &'static str = {
        metrics::describe_counter!(
            "sieve_overrides_written_total",
            "Total number of include/exclude overrides written."
        );
        "sieve_overrides_written_total"
    };
    /// Track number of overrides removed by reset.
    pub static ref OVERRIDES_RESET: &'static str = {
        metrics::describe_counter!(
            "sieve_overrides_reset_total",
            "Total number of overrides removed by reset."
        );
        "sieve_overrides_reset_total"
    };
    /// Track number of clear operations.
    pub static ref CLEARS: &'static str = {
        metrics::describe_counter!(
            "sieve_clear_total",
            "Total number of clear operations."
        );
        "sieve_clear_total"
    };
    /// Track number of default policy changes.
    pub static ref DEFAULT_CHANGES: &'static str = {
        metrics::describe_counter!(
            "sieve_default_policy_changes_total",
            "Total number of default policy changes."
        );
        "sieve_default_policy_changes_total"
    };
}

/// Label value for [`Classifier`](crate::Classifier).
pub(crate) const SEQUENTIAL: &str = "sequential";
/// Label value for [`ConcurrentClassifier`](crate::ConcurrentClassifier).
pub(crate) const CONCURRENT: &str = "concurrent";

#[inline]
pub(crate) fn record_override(kind: &'static str, policy: Policy) {
    #[cfg(feature = "metrics")]
    metrics::counter!(*OVERRIDES_WRITTEN, "kind" => kind, "policy" => policy.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = (kind, policy);
}

#[inline]
pub(crate) fn record_reset(kind: &'static str, removed: bool) {
    #[cfg(feature = "metrics")]
    {
        if removed {
            metrics::counter!(*OVERRIDES_RESET, "kind" => kind).increment(1);
        }
    }
    #[cfg(not(feature = "metrics"))]
    let _ = (kind, removed);
}

#[inline]
pub(crate) fn record_clear(kind: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(*CLEARS, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

#[inline]
pub(crate) fn record_default_change(kind: &'static str, policy: Policy) {
    #[cfg(feature = "metrics")]
    metrics::counter!(*DEFAULT_CHANGES, "kind" => kind, "policy" => policy.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = (kind, policy);
}
