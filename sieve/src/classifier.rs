//! Single-owner classifier backed by a `HashMap`.

use std::collections::HashMap;
use std::collections::hash_map;
use std::hash::Hash;

use sieve_core::{
    BoxClassifier, ClassifierResult, Classify, ClassifyMut, Overrides, Policy,
    observationally_eq,
};
use tracing::{debug, trace};

use crate::metrics::{self, SEQUENTIAL};
use crate::read_only::ReadOnlyClassifier;

/// Include/exclude classifier for a single owner.
///
/// Mutation requires `&mut self`, so sharing a `Classifier` between threads
/// needs external synchronisation (for example a `Mutex`). Use
/// [`ConcurrentClassifier`](crate::ConcurrentClassifier) when several threads
/// must write without a shared lock.
///
/// Mutators return `&mut Self` so calls chain:
///
/// ```
/// use sieve::prelude::*;
///
/// let mut classifier = Classifier::with_default(Policy::Exclude);
/// classifier.include("alpha").include("beta").exclude("beta");
///
/// assert!(classifier.should_include(&"alpha"));
/// assert!(classifier.should_exclude(&"beta"));
/// assert!(classifier.should_exclude(&"gamma"));
/// ```
#[derive(Debug, Clone)]
pub struct Classifier<T> {
    default_policy: Policy,
    overrides: HashMap<T, Policy>,
}

impl<T> Classifier<T>
where
    T: Eq + Hash,
{
    /// Creates an empty classifier with the default policy ([`Policy::Include`]).
    pub fn new() -> Self {
        Self::with_default(Policy::default())
    }

    /// Creates an empty classifier with the given default policy.
    pub fn with_default(default_policy: Policy) -> Self {
        Self {
            default_policy,
            overrides: HashMap::new(),
        }
    }

    /// Creates an empty classifier with room for `capacity` overrides.
    pub fn with_capacity(default_policy: Policy, capacity: usize) -> Self {
        Self {
            default_policy,
            overrides: HashMap::with_capacity(capacity),
        }
    }

    /// Replaces the default policy. Overrides are kept.
    pub fn set_default_policy(&mut self, policy: Policy) -> &mut Self {
        if self.default_policy != policy {
            debug!(%policy, "classifier default policy changed");
            metrics::record_default_change(SEQUENTIAL, policy);
        }
        self.default_policy = policy;
        self
    }

    /// Registers `item` as included, replacing any prior override.
    pub fn include(&mut self, item: T) -> &mut Self {
        self.apply(item, Policy::Include)
    }

    /// Registers `item` as excluded, replacing any prior override.
    pub fn exclude(&mut self, item: T) -> &mut Self {
        self.apply(item, Policy::Exclude)
    }

    /// Registers `item` with `policy`, replacing any prior override.
    pub fn apply(&mut self, item: T, policy: Policy) -> &mut Self {
        let previous = self.overrides.insert(item, policy);
        trace!(%policy, replaced = ?previous, "override registered");
        metrics::record_override(SEQUENTIAL, policy);
        self
    }

    /// Registers every item as included.
    pub fn include_all<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.include(item);
        }
        self
    }

    /// Registers every item as excluded.
    pub fn exclude_all<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.exclude(item);
        }
        self
    }

    /// Removes the override for `item` so it falls back to the default.
    ///
    /// Returns whether an override existed.
    pub fn reset(&mut self, item: &T) -> bool {
        let removed = self.overrides.remove(item).is_some();
        trace!(removed, "override reset");
        metrics::record_reset(SEQUENTIAL, removed);
        removed
    }

    /// Removes the overrides of every item.
    pub fn reset_all<'a, I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for item in items {
            self.reset(item);
        }
        self
    }

    /// Removes every override. The default policy is kept.
    pub fn clear(&mut self) -> &mut Self {
        debug!(removed = self.overrides.len(), "classifier cleared");
        self.overrides.clear();
        metrics::record_clear(SEQUENTIAL);
        self
    }

    /// Iterates over registered overrides without cloning items.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.overrides.iter(),
        }
    }

    /// Wraps the classifier into a view that rejects mutation.
    pub fn read_only(self) -> ReadOnlyClassifier<Self> {
        ReadOnlyClassifier::new(self)
    }
}

impl<T> Default for Classifier<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowing iterator over the overrides of a [`Classifier`].
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    inner: hash_map::Iter<'a, T, Policy>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a T, Policy);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(item, policy)| (item, *policy))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Classifier<T>
where
    T: Eq + Hash,
{
    type Item = (&'a T, Policy);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Extend<(T, Policy)> for Classifier<T>
where
    T: Eq + Hash,
{
    fn extend<I: IntoIterator<Item = (T, Policy)>>(&mut self, iter: I) {
        for (item, policy) in iter {
            self.apply(item, policy);
        }
    }
}

impl<T> FromIterator<(T, Policy)> for Classifier<T>
where
    T: Eq + Hash,
{
    /// Collects overrides into a classifier with the default policy.
    fn from_iter<I: IntoIterator<Item = (T, Policy)>>(iter: I) -> Self {
        let mut classifier = Self::new();
        classifier.extend(iter);
        classifier
    }
}

impl<T> Classify for Classifier<T>
where
    T: Eq + Hash + Clone,
{
    type Item = T;

    fn default_policy(&self) -> Policy {
        self.default_policy
    }

    fn policy_of(&self, item: &T) -> Option<Policy> {
        self.overrides.get(item).copied()
    }

    fn overrides(&self) -> Overrides<'_, T> {
        Box::new(
            self.overrides
                .iter()
                .map(|(item, policy)| (item.clone(), *policy)),
        )
    }

    fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl<T> ClassifyMut for Classifier<T>
where
    T: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn try_set_default_policy(&mut self, policy: Policy) -> ClassifierResult<()> {
        self.set_default_policy(policy);
        Ok(())
    }

    fn try_include(&mut self, item: T) -> ClassifierResult<()> {
        self.include(item);
        Ok(())
    }

    fn try_exclude(&mut self, item: T) -> ClassifierResult<()> {
        self.exclude(item);
        Ok(())
    }

    fn try_reset(&mut self, item: &T) -> ClassifierResult<bool> {
        Ok(self.reset(item))
    }

    fn try_clear(&mut self) -> ClassifierResult<()> {
        self.clear();
        Ok(())
    }

    fn clone_box(&self) -> BoxClassifier<T> {
        Box::new(self.clone())
    }
}

impl<T, O> PartialEq<O> for Classifier<T>
where
    T: Eq + Hash + Clone,
    O: Classify<Item = T> + ?Sized,
{
    fn eq(&self, other: &O) -> bool {
        observationally_eq(self, other)
    }
}

impl<T> Eq for Classifier<T> where T: Eq + Hash + Clone {}

#[cfg(test)]
mod tests {
    use sieve_core::ClassifyExt;

    use super::*;

    #[test]
    fn test_new_uses_include_default() {
        let classifier = Classifier::<u32>::new();
        assert_eq!(classifier.default_policy(), Policy::Include);
        assert!(classifier.is_empty());
    }

    #[test]
    fn test_default_fallback() {
        let classifier = Classifier::<u32>::with_default(Policy::Exclude);
        for item in 0..100 {
            assert!(!classifier.should_include(&item));
        }
    }

    #[test]
    fn test_override_precedence() {
        for default in [Policy::Include, Policy::Exclude] {
            let mut classifier = Classifier::with_default(default);
            classifier.include(1).exclude(2);

            assert!(classifier.should_include(&1));
            assert!(!classifier.should_include(&2));
        }
    }

    #[test]
    fn test_last_write_wins() {
        let mut classifier = Classifier::new();
        classifier.include(1).exclude(1);
        assert!(!classifier.should_include(&1));
        assert!(!classifier.is_explicitly_included(&1));
        assert!(classifier.is_explicitly_excluded(&1));

        classifier.exclude(2).include(2);
        assert!(classifier.should_include(&2));
        assert_eq!(classifier.override_count(), 2);
    }

    #[test]
    fn test_reset_reverts_to_default() {
        let mut classifier = Classifier::with_default(Policy::Exclude);
        classifier.include(1);

        assert!(classifier.reset(&1));
        assert!(!classifier.should_include(&1));
        assert!(!classifier.reset(&1));
    }

    #[test]
    fn test_reset_all() {
        let mut classifier = Classifier::with_default(Policy::Exclude);
        classifier.include_all([1, 2, 3]);

        classifier.reset_all(&[1, 3]);

        assert!(!classifier.should_include(&1));
        assert!(classifier.should_include(&2));
        assert!(!classifier.should_include(&3));
    }

    #[test]
    fn test_clear_keeps_default() {
        let mut classifier = Classifier::with_default(Policy::Exclude);
        classifier.include_all([1, 2]).exclude_all([3]);

        classifier.clear();

        assert_eq!(classifier.default_policy(), Policy::Exclude);
        assert_eq!(classifier.explicit_included_items().count(), 0);
        assert_eq!(classifier.explicit_excluded_items().count(), 0);
        assert!(!classifier.any_included([1, 2, 3]));
    }

    #[test]
    fn test_default_change_keeps_overrides() {
        let mut classifier = Classifier::with_default(Policy::Exclude);
        classifier.exclude(1);

        classifier.set_default_policy(Policy::Include);

        assert!(classifier.should_include(&2));
        assert!(!classifier.should_include(&1));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = Classifier::with_default(Policy::Include);
        original.include(1);

        let mut copy = original.clone();
        copy.exclude(1).exclude(2);

        assert!(original.should_include(&1));
        assert!(original.should_include(&2));
        assert!(!copy.should_include(&1));
        assert_ne!(original, copy);
    }

    #[test]
    fn test_collect_and_iter() {
        let classifier: Classifier<&str> = [("a", Policy::Include), ("b", Policy::Exclude)]
            .into_iter()
            .collect();

        let mut pairs: Vec<_> = classifier.iter().map(|(item, p)| (*item, p)).collect();
        pairs.sort_by_key(|(item, _)| *item);

        assert_eq!(pairs, vec![("a", Policy::Include), ("b", Policy::Exclude)]);
        assert_eq!(classifier.iter().len(), 2);
    }

    #[test]
    fn test_equality_ignores_redundant_overrides() {
        let mut explicit = Classifier::with_default(Policy::Exclude);
        explicit.exclude(1);
        let implicit = Classifier::<i32>::with_default(Policy::Exclude);

        assert_eq!(explicit, implicit);
    }

    #[test]
    fn test_string_items() {
        let mut classifier = Classifier::with_default(Policy::Exclude);
        classifier.include(String::from("kept"));

        assert!(classifier.should_include(&"kept".to_owned()));
        assert!(!classifier.should_include(&"other".to_owned()));
    }
}
