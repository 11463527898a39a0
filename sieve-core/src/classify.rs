//! Capability traits shared by every classifier kind.
//!
//! ## Overview
//!
//! A classifier holds a default [`Policy`] and a set of per-item overrides.
//! Resolution is always the same:
//!
//! - an item with an override resolves to that override;
//! - any other item resolves to the default policy.
//!
//! [`Classify`] exposes this read side through four required primitives
//! ([`default_policy`](Classify::default_policy), [`policy_of`](Classify::policy_of),
//! [`overrides`](Classify::overrides), [`override_count`](Classify::override_count));
//! every other query is a provided method built on them, so two kinds that
//! agree on the primitives answer every query identically.
//!
//! [`ClassifyMut`] is the write side. Its methods are fallible because a
//! read-only view implements the full capability set but rejects mutation
//! with [`ClassifierError::UnsupportedOperation`](crate::ClassifierError).

use std::hash::Hash;
use std::sync::Arc;

use crate::error::ClassifierResult;
use crate::policy::Policy;

/// Lazy sequence of `(item, override)` pairs.
///
/// Iteration order is unspecified.
pub type Overrides<'a, T> = Box<dyn Iterator<Item = (T, Policy)> + 'a>;

/// Lazy sequence of items explicitly registered with one policy.
///
/// Iteration order is unspecified. Call the producing method again to restart.
pub type ExplicitItems<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Boxed classifier of any kind, shareable across threads.
pub type BoxClassifier<T> = Box<dyn ClassifyMut<Item = T> + Send + Sync>;

/// Read side of a classifier.
///
/// Object safe: algorithms can hold a `&dyn Classify<Item = T>` without
/// knowing which concrete kind backs it.
pub trait Classify {
    /// The type of classified items.
    type Item: Eq + Hash + Clone;

    /// Policy applied to items without an override.
    fn default_policy(&self) -> Policy;

    /// The override registered for `item`, if any.
    fn policy_of(&self, item: &Self::Item) -> Option<Policy>;

    /// All registered overrides.
    ///
    /// The sequence is finite and yields owned items.
    fn overrides(&self) -> Overrides<'_, Self::Item>;

    /// Number of registered overrides.
    fn override_count(&self) -> usize;

    /// Returns `true` when no override is registered.
    fn is_empty(&self) -> bool {
        self.override_count() == 0
    }

    /// Effective policy for `item`: its override, else the default.
    fn resolve(&self, item: &Self::Item) -> Policy {
        self.policy_of(item).unwrap_or_else(|| self.default_policy())
    }

    /// Whether `item` should be included.
    fn should_include(&self, item: &Self::Item) -> bool {
        self.resolve(item).is_include()
    }

    /// Whether `item` should be excluded.
    fn should_exclude(&self, item: &Self::Item) -> bool {
        self.resolve(item).is_exclude()
    }

    /// Whether `item` carries an [`Policy::Include`] override.
    fn is_explicitly_included(&self, item: &Self::Item) -> bool {
        self.policy_of(item) == Some(Policy::Include)
    }

    /// Whether `item` carries an [`Policy::Exclude`] override.
    fn is_explicitly_excluded(&self, item: &Self::Item) -> bool {
        self.policy_of(item) == Some(Policy::Exclude)
    }

    /// Whether `item` carries any override.
    fn contains_explicitly(&self, item: &Self::Item) -> bool {
        self.policy_of(item).is_some()
    }

    /// Items whose override equals `policy`.
    fn explicit_items(&self, policy: Policy) -> ExplicitItems<'_, Self::Item> {
        Box::new(
            self.overrides()
                .filter_map(move |(item, registered)| (registered == policy).then_some(item)),
        )
    }

    /// Items explicitly included.
    fn explicit_included_items(&self) -> ExplicitItems<'_, Self::Item> {
        self.explicit_items(Policy::Include)
    }

    /// Items explicitly excluded.
    fn explicit_excluded_items(&self) -> ExplicitItems<'_, Self::Item> {
        self.explicit_items(Policy::Exclude)
    }
}

/// Write side of a classifier.
///
/// Every method returns a [`ClassifierResult`]. Owned classifiers always
/// succeed; read-only views always fail.
pub trait ClassifyMut: Classify {
    /// Replaces the default policy.
    fn try_set_default_policy(&mut self, policy: Policy) -> ClassifierResult<()>;

    /// Registers `item` as included, replacing any prior override.
    fn try_include(&mut self, item: Self::Item) -> ClassifierResult<()>;

    /// Registers `item` as excluded, replacing any prior override.
    fn try_exclude(&mut self, item: Self::Item) -> ClassifierResult<()>;

    /// Removes the override for `item`.
    ///
    /// Returns whether an override existed.
    fn try_reset(&mut self, item: &Self::Item) -> ClassifierResult<bool>;

    /// Removes every override. The default policy is kept.
    fn try_clear(&mut self) -> ClassifierResult<()>;

    /// Clone this classifier into a box (for object safety).
    ///
    /// The copy is independent of `self` and keeps its concrete kind.
    fn clone_box(&self) -> BoxClassifier<Self::Item>;

    /// Registers `item` with `policy`.
    fn try_apply(&mut self, item: Self::Item, policy: Policy) -> ClassifierResult<()> {
        match policy {
            Policy::Include => self.try_include(item),
            Policy::Exclude => self.try_exclude(item),
        }
    }

    /// Registers every item as included. Stops at the first failure.
    fn try_include_all<I>(&mut self, items: I) -> ClassifierResult<()>
    where
        I: IntoIterator<Item = Self::Item>,
        Self: Sized,
    {
        items.into_iter().try_for_each(|item| self.try_include(item))
    }

    /// Registers every item as excluded. Stops at the first failure.
    fn try_exclude_all<I>(&mut self, items: I) -> ClassifierResult<()>
    where
        I: IntoIterator<Item = Self::Item>,
        Self: Sized,
    {
        items.into_iter().try_for_each(|item| self.try_exclude(item))
    }
}

impl<C> Classify for &C
where
    C: Classify + ?Sized,
{
    type Item = C::Item;

    fn default_policy(&self) -> Policy {
        (**self).default_policy()
    }

    fn policy_of(&self, item: &Self::Item) -> Option<Policy> {
        (**self).policy_of(item)
    }

    fn overrides(&self) -> Overrides<'_, Self::Item> {
        (**self).overrides()
    }

    fn override_count(&self) -> usize {
        (**self).override_count()
    }
}

impl<C> Classify for &mut C
where
    C: Classify + ?Sized,
{
    type Item = C::Item;

    fn default_policy(&self) -> Policy {
        (**self).default_policy()
    }

    fn policy_of(&self, item: &Self::Item) -> Option<Policy> {
        (**self).policy_of(item)
    }

    fn overrides(&self) -> Overrides<'_, Self::Item> {
        (**self).overrides()
    }

    fn override_count(&self) -> usize {
        (**self).override_count()
    }
}

impl<C> Classify for Box<C>
where
    C: Classify + ?Sized,
{
    type Item = C::Item;

    fn default_policy(&self) -> Policy {
        self.as_ref().default_policy()
    }

    fn policy_of(&self, item: &Self::Item) -> Option<Policy> {
        self.as_ref().policy_of(item)
    }

    fn overrides(&self) -> Overrides<'_, Self::Item> {
        self.as_ref().overrides()
    }

    fn override_count(&self) -> usize {
        self.as_ref().override_count()
    }
}

impl<C> Classify for Arc<C>
where
    C: Classify + ?Sized,
{
    type Item = C::Item;

    fn default_policy(&self) -> Policy {
        self.as_ref().default_policy()
    }

    fn policy_of(&self, item: &Self::Item) -> Option<Policy> {
        self.as_ref().policy_of(item)
    }

    fn overrides(&self) -> Overrides<'_, Self::Item> {
        self.as_ref().overrides()
    }

    fn override_count(&self) -> usize {
        self.as_ref().override_count()
    }
}

impl<T> Clone for BoxClassifier<T>
where
    T: Eq + Hash + Clone,
{
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl<C> ClassifyMut for &mut C
where
    C: ClassifyMut + ?Sized,
{
    fn try_set_default_policy(&mut self, policy: Policy) -> ClassifierResult<()> {
        (**self).try_set_default_policy(policy)
    }

    fn try_include(&mut self, item: Self::Item) -> ClassifierResult<()> {
        (**self).try_include(item)
    }

    fn try_exclude(&mut self, item: Self::Item) -> ClassifierResult<()> {
        (**self).try_exclude(item)
    }

    fn try_reset(&mut self, item: &Self::Item) -> ClassifierResult<bool> {
        (**self).try_reset(item)
    }

    fn try_clear(&mut self) -> ClassifierResult<()> {
        (**self).try_clear()
    }

    fn clone_box(&self) -> BoxClassifier<Self::Item> {
        (**self).clone_box()
    }
}

impl<C> ClassifyMut for Box<C>
where
    C: ClassifyMut + ?Sized,
{
    fn try_set_default_policy(&mut self, policy: Policy) -> ClassifierResult<()> {
        self.as_mut().try_set_default_policy(policy)
    }

    fn try_include(&mut self, item: Self::Item) -> ClassifierResult<()> {
        self.as_mut().try_include(item)
    }

    fn try_exclude(&mut self, item: Self::Item) -> ClassifierResult<()> {
        self.as_mut().try_exclude(item)
    }

    fn try_reset(&mut self, item: &Self::Item) -> ClassifierResult<bool> {
        self.as_mut().try_reset(item)
    }

    fn try_clear(&mut self) -> ClassifierResult<()> {
        self.as_mut().try_clear()
    }

    fn clone_box(&self) -> BoxClassifier<Self::Item> {
        self.as_ref().clone_box()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::ClassifierError;

    /// Minimal map-backed classifier exercising the provided methods.
    #[derive(Clone)]
    struct MapClassifier {
        default: Policy,
        map: HashMap<u32, Policy>,
    }

    impl MapClassifier {
        fn new(default: Policy) -> Self {
            Self {
                default,
                map: HashMap::new(),
            }
        }
    }

    impl Classify for MapClassifier {
        type Item = u32;

        fn default_policy(&self) -> Policy {
            self.default
        }

        fn policy_of(&self, item: &u32) -> Option<Policy> {
            self.map.get(item).copied()
        }

        fn overrides(&self) -> Overrides<'_, u32> {
            Box::new(self.map.iter().map(|(item, policy)| (*item, *policy)))
        }

        fn override_count(&self) -> usize {
            self.map.len()
        }
    }

    impl ClassifyMut for MapClassifier {
        fn try_set_default_policy(&mut self, policy: Policy) -> ClassifierResult<()> {
            self.default = policy;
            Ok(())
        }

        fn try_include(&mut self, item: u32) -> ClassifierResult<()> {
            self.map.insert(item, Policy::Include);
            Ok(())
        }

        fn try_exclude(&mut self, item: u32) -> ClassifierResult<()> {
            self.map.insert(item, Policy::Exclude);
            Ok(())
        }

        fn try_reset(&mut self, item: &u32) -> ClassifierResult<bool> {
            Ok(self.map.remove(item).is_some())
        }

        fn try_clear(&mut self) -> ClassifierResult<()> {
            self.map.clear();
            Ok(())
        }

        fn clone_box(&self) -> BoxClassifier<u32> {
            Box::new(self.clone())
        }
    }

    /// Rejects item 3 and every exclusion.
    #[derive(Clone)]
    struct Flaky(MapClassifier);

    impl Classify for Flaky {
        type Item = u32;

        fn default_policy(&self) -> Policy {
            self.0.default_policy()
        }

        fn policy_of(&self, item: &u32) -> Option<Policy> {
            self.0.policy_of(item)
        }

        fn overrides(&self) -> Overrides<'_, u32> {
            self.0.overrides()
        }

        fn override_count(&self) -> usize {
            self.0.override_count()
        }
    }

    impl ClassifyMut for Flaky {
        fn try_set_default_policy(&mut self, policy: Policy) -> ClassifierResult<()> {
            self.0.try_set_default_policy(policy)
        }

        fn try_include(&mut self, item: u32) -> ClassifierResult<()> {
            if item == 3 {
                return Err(ClassifierError::unsupported("include"));
            }
            self.0.try_include(item)
        }

        fn try_exclude(&mut self, _item: u32) -> ClassifierResult<()> {
            Err(ClassifierError::unsupported("exclude"))
        }

        fn try_reset(&mut self, item: &u32) -> ClassifierResult<bool> {
            self.0.try_reset(item)
        }

        fn try_clear(&mut self) -> ClassifierResult<()> {
            self.0.try_clear()
        }

        fn clone_box(&self) -> BoxClassifier<u32> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let classifier = MapClassifier::new(Policy::Exclude);
        assert_eq!(classifier.resolve(&1), Policy::Exclude);
        assert!(classifier.should_exclude(&1));
        assert!(!classifier.contains_explicitly(&1));
    }

    #[test]
    fn test_override_wins_over_default() {
        let mut classifier = MapClassifier::new(Policy::Exclude);
        classifier.try_include(1).unwrap();
        assert!(classifier.should_include(&1));
        assert!(classifier.is_explicitly_included(&1));
        assert!(!classifier.is_explicitly_excluded(&1));
    }

    #[test]
    fn test_explicit_items_are_partitioned() {
        let mut classifier = MapClassifier::new(Policy::Include);
        classifier.try_include_all([1, 2]).unwrap();
        classifier.try_exclude_all([3]).unwrap();

        let mut included: Vec<_> = classifier.explicit_included_items().collect();
        included.sort();
        let excluded: Vec<_> = classifier.explicit_excluded_items().collect();

        assert_eq!(included, vec![1, 2]);
        assert_eq!(excluded, vec![3]);
    }

    #[test]
    fn test_explicit_items_restartable() {
        let mut classifier = MapClassifier::new(Policy::Include);
        classifier.try_exclude_all([1, 2, 3]).unwrap();

        assert_eq!(classifier.explicit_excluded_items().count(), 3);
        assert_eq!(classifier.explicit_excluded_items().count(), 3);
    }

    #[test]
    fn test_try_apply_dispatches_on_policy() {
        let mut classifier = MapClassifier::new(Policy::Include);
        classifier.try_apply(7, Policy::Exclude).unwrap();
        assert!(classifier.is_explicitly_excluded(&7));
    }

    #[test]
    fn test_bulk_stops_at_first_failure() {
        let mut classifier = Flaky(MapClassifier::new(Policy::Exclude));

        let result = classifier.try_include_all([1, 2, 3, 4]);

        assert_eq!(result, Err(ClassifierError::unsupported("include")));
        assert!(classifier.is_explicitly_included(&2));
        assert!(!classifier.contains_explicitly(&4));
    }

    #[test]
    fn test_trait_object_dispatch() {
        let mut boxed: Box<dyn ClassifyMut<Item = u32>> =
            Box::new(MapClassifier::new(Policy::Exclude));
        boxed.try_include(5).unwrap();

        let shared: &dyn Classify<Item = u32> = &boxed;
        assert!(shared.should_include(&5));
        assert!(!shared.should_include(&6));
    }

    #[test]
    fn test_boxed_clone_is_independent() {
        let mut original: BoxClassifier<u32> = Box::new(MapClassifier::new(Policy::Exclude));
        original.try_include(1).unwrap();

        let mut copy = original.clone();
        copy.try_exclude(1).unwrap();
        copy.try_set_default_policy(Policy::Include).unwrap();
        original.try_clear().unwrap();

        assert!(copy.is_explicitly_excluded(&1));
        assert_eq!(copy.default_policy(), Policy::Include);
        assert!(original.is_empty());
        assert_eq!(original.default_policy(), Policy::Exclude);
    }

    #[test]
    fn test_arc_delegates() {
        let mut inner = MapClassifier::new(Policy::Include);
        inner.try_exclude(9).unwrap();
        let shared = Arc::new(inner);

        assert!(shared.should_exclude(&9));
        assert_eq!(shared.override_count(), 1);
    }
}
