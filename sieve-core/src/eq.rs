//! Observational equality between classifiers.
//!
//! Two classifiers are equal when no query can tell them apart: they share a
//! default policy and agree on [`should_include`](Classify::should_include)
//! for every item either of them overrides. Items overridden by neither side
//! resolve to the shared default, so this is equivalent to agreeing on every
//! possible item.
//!
//! The comparison never looks at enumeration order, and it tolerates
//! redundant overrides: an item explicitly included by one side and merely
//! included by default on the other does not make them unequal.

use crate::classify::Classify;
use crate::policy::Policy;

/// Compares two classifiers, possibly of different kinds, by behaviour.
pub fn observationally_eq<A, B>(left: &A, right: &B) -> bool
where
    A: Classify + ?Sized,
    B: Classify<Item = A::Item> + ?Sized,
{
    left.default_policy() == right.default_policy()
        && agrees_on_overrides(left, right)
        && agrees_on_overrides(right, left)
}

/// Checks that `other` resolves every item overridden by `source` the same way.
///
/// The overrides are collected before querying `other`: a concurrent
/// classifier holds shard read locks while iterating, and `other` may be the
/// same instance.
fn agrees_on_overrides<A, B>(source: &A, other: &B) -> bool
where
    A: Classify + ?Sized,
    B: Classify<Item = A::Item> + ?Sized,
{
    let overrides: Vec<(A::Item, Policy)> = source.overrides().collect();
    overrides
        .iter()
        .all(|(item, policy)| other.resolve(item) == *policy)
}
