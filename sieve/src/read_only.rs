//! Read-only view over any classifier.

use sieve_core::{
    BoxClassifier, ClassifierError, ClassifierResult, Classify, ClassifyMut, ExplicitItems,
    Overrides, Policy, observationally_eq,
};
use tracing::warn;

use crate::classifier::Classifier;

/// A classifier view that answers queries and rejects mutation.
///
/// Every query delegates to the wrapped classifier, so the view is always
/// equal to it. Every [`ClassifyMut`] method fails with
/// [`ClassifierError::UnsupportedOperation`].
///
/// The wrapped value may be owned, borrowed, or shared. Wrapping an
/// `Arc<ConcurrentClassifier<T>>` hands out a live view: writers holding
/// another clone of the `Arc` keep mutating, and the view observes their
/// writes.
///
/// Cloning the view clones the wrapped value. For an owned classifier that
/// is an independent copy; for an `Arc` or a reference it is another view of
/// the same state. [`clone_box`](ClassifyMut::clone_box) always copies: it
/// freezes the current state into a view over a fresh [`Classifier`].
///
/// ```
/// use sieve::prelude::*;
/// use sieve::ClassifierError;
///
/// let mut classifier = Classifier::with_default(Policy::Exclude);
/// classifier.include(1);
///
/// let mut view = classifier.read_only();
/// assert!(view.should_include(&1));
/// assert_eq!(
///     view.try_include(2),
///     Err(ClassifierError::UnsupportedOperation { operation: "include" }),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ReadOnlyClassifier<C> {
    inner: C,
}

impl<C> ReadOnlyClassifier<C> {
    /// Wraps `inner`.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Returns the wrapped classifier.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Unwraps the view, giving mutable access back to the owner.
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn reject<R>(operation: &'static str) -> ClassifierResult<R> {
        warn!(operation, "mutation rejected by read-only classifier");
        Err(ClassifierError::unsupported(operation))
    }
}

impl<C> Classify for ReadOnlyClassifier<C>
where
    C: Classify,
{
    type Item = C::Item;

    fn default_policy(&self) -> Policy {
        self.inner.default_policy()
    }

    fn policy_of(&self, item: &Self::Item) -> Option<Policy> {
        self.inner.policy_of(item)
    }

    fn overrides(&self) -> Overrides<'_, Self::Item> {
        self.inner.overrides()
    }

    fn override_count(&self) -> usize {
        self.inner.override_count()
    }

    fn explicit_items(&self, policy: Policy) -> ExplicitItems<'_, Self::Item> {
        self.inner.explicit_items(policy)
    }
}

impl<C> ClassifyMut for ReadOnlyClassifier<C>
where
    C: Classify,
    C::Item: Send + Sync + 'static,
{
    fn try_set_default_policy(&mut self, _policy: Policy) -> ClassifierResult<()> {
        Self::reject("set_default_policy")
    }

    fn try_include(&mut self, _item: Self::Item) -> ClassifierResult<()> {
        Self::reject("include")
    }

    fn try_exclude(&mut self, _item: Self::Item) -> ClassifierResult<()> {
        Self::reject("exclude")
    }

    fn try_reset(&mut self, _item: &Self::Item) -> ClassifierResult<bool> {
        Self::reject("reset")
    }

    fn try_clear(&mut self) -> ClassifierResult<()> {
        Self::reject("clear")
    }

    fn try_apply(&mut self, _item: Self::Item, policy: Policy) -> ClassifierResult<()> {
        Self::reject(policy.as_str())
    }

    fn try_include_all<I>(&mut self, _items: I) -> ClassifierResult<()>
    where
        I: IntoIterator<Item = Self::Item>,
    {
        Self::reject("include")
    }

    fn try_exclude_all<I>(&mut self, _items: I) -> ClassifierResult<()>
    where
        I: IntoIterator<Item = Self::Item>,
    {
        Self::reject("exclude")
    }
    fn clone_box(&self) -> BoxClassifier<Self::Item> {
        let mut frozen =
            Classifier::with_capacity(self.inner.default_policy(), self.inner.override_count());
        frozen.extend(self.inner.overrides());
        Box::new(ReadOnlyClassifier::new(frozen))
    }
}

impl<C, O> PartialEq<O> for ReadOnlyClassifier<C>
where
    C: Classify,
    O: Classify<Item = C::Item> + ?Sized,
{
    fn eq(&self, other: &O) -> bool {
        observationally_eq(&self.inner, other)
    }
}

impl<C> Eq for ReadOnlyClassifier<C> where C: Classify {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sieve_core::ClassifyExt;

    use super::*;
    use crate::{Classifier, ConcurrentClassifier};

    fn unsupported(operation: &'static str) -> ClassifierError {
        ClassifierError::UnsupportedOperation { operation }
    }

    #[test]
    fn test_queries_delegate() {
        let mut classifier = Classifier::with_default(Policy::Exclude);
        classifier.include_all([1, 2]).exclude(3);
        let view = classifier.clone().read_only();

        assert!(view.should_include(&1));
        assert!(view.is_explicitly_excluded(&3));
        assert!(!view.should_include(&4));
        assert!(view.any_explicit_included([5, 2]));
        assert_eq!(view.explicit_included_items().count(), 2);
        assert_eq!(view, classifier);
    }

    #[test]
    fn test_every_mutation_is_rejected() {
        let mut view = Classifier::<u32>::with_default(Policy::Include).read_only();

        assert_eq!(
            view.try_set_default_policy(Policy::Exclude),
            Err(unsupported("set_default_policy"))
        );
        assert_eq!(view.try_include(1), Err(unsupported("include")));
        assert_eq!(view.try_exclude(1), Err(unsupported("exclude")));
        assert_eq!(view.try_reset(&1), Err(unsupported("reset")));
        assert_eq!(view.try_clear(), Err(unsupported("clear")));
        assert_eq!(
            view.try_apply(1, Policy::Exclude),
            Err(unsupported("exclude"))
        );
        assert_eq!(view.default_policy(), Policy::Include);
        assert!(view.is_empty());
    }

    #[test]
    fn test_bulk_mutation_rejected_even_when_empty() {
        let mut view = Classifier::<u32>::new().read_only();

        assert_eq!(
            view.try_include_all(Vec::new()),
            Err(unsupported("include"))
        );
        assert_eq!(
            view.try_exclude_all(Vec::new()),
            Err(unsupported("exclude"))
        );
    }

    #[test]
    fn test_live_view_over_shared_concurrent() {
        let shared = Arc::new(ConcurrentClassifier::with_default(Policy::Exclude));
        let view = ReadOnlyClassifier::new(Arc::clone(&shared));

        shared.include(10);

        assert!(view.should_include(&10));
        assert_eq!(view, *shared);
    }

    #[test]
    fn test_clone_box_freezes_live_view() {
        let shared = Arc::new(ConcurrentClassifier::with_default(Policy::Exclude));
        shared.include(1);
        let view = ReadOnlyClassifier::new(Arc::clone(&shared));

        let mut copy = view.clone_box();
        shared.include(2);
        shared.set_default_policy(Policy::Include);

        assert!(view.is_explicitly_included(&2));
        assert!(copy.is_explicitly_included(&1));
        assert!(!copy.contains_explicitly(&2));
        assert_eq!(copy.default_policy(), Policy::Exclude);
        assert_eq!(copy.try_include(3), Err(unsupported("include")));
    }

    #[test]
    fn test_into_inner_restores_mutation() {
        let view = Classifier::with_default(Policy::Exclude).read_only();
        let mut classifier = view.into_inner();

        classifier.include(1);

        assert!(classifier.should_include(&1));
    }

    #[test]
    fn test_view_over_trait_object() {
        let classifier: Box<dyn Classify<Item = i32>> =
            Box::new(ConcurrentClassifier::<i32>::with_default(Policy::Include));
        let mut view = ReadOnlyClassifier::new(classifier);

        assert!(view.should_include(&0));
        assert!(view.try_exclude(0).is_err());
    }
}
