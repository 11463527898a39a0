//! Thread-safe classifier backed by a sharded `DashMap`.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use sieve_core::{
    BoxClassifier, ClassifierResult, Classify, ClassifyMut, Overrides, Policy,
    observationally_eq,
};
use tracing::{debug, trace};

use crate::classifier::Classifier;
use crate::metrics::{self, CONCURRENT};
use crate::read_only::ReadOnlyClassifier;

/// Include/exclude classifier shared between threads.
///
/// Every operation takes `&self`, so one instance can sit behind an `Arc`
/// and be mutated and queried from many threads without an external lock.
///
/// # Consistency
///
/// - Each single-item operation is atomic: readers observe either the old or
///   the new override of an item, never a partial write.
/// - Operations on different items only contend when they hash to the same
///   shard, and never block each other for longer than one map operation.
/// - Concurrent writes to the same item race; whichever lands last wins.
/// - [`clear`](Self::clear) empties the map shard by shard. An
///   [`include`](Self::include) or [`exclude`](Self::exclude) running at the
///   same time may survive the clear.
/// - Iterating with [`overrides`](Classify::overrides) or the explicit item
///   sequences holds a shard read lock while that shard is visited. Do not
///   mutate the same classifier from inside such a loop.
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use sieve::prelude::*;
///
/// let classifier = Arc::new(ConcurrentClassifier::with_default(Policy::Exclude));
///
/// let handles: Vec<_> = (0..4)
///     .map(|worker| {
///         let classifier = Arc::clone(&classifier);
///         thread::spawn(move || {
///             classifier.include(worker);
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert!(classifier.any_included([0, 1, 2, 3]));
/// assert_eq!(classifier.override_count(), 4);
/// ```
pub struct ConcurrentClassifier<T> {
    include_by_default: AtomicBool,
    overrides: DashMap<T, Policy>,
}

impl<T> ConcurrentClassifier<T>
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
            include_by_default: AtomicBool::new(default_policy.is_include()),
            overrides: DashMap::new(),
        }
    }

    /// Creates an empty classifier with room for `capacity` overrides.
    pub fn with_capacity(default_policy: Policy, capacity: usize) -> Self {
        Self {
            include_by_default: AtomicBool::new(default_policy.is_include()),
            overrides: DashMap::with_capacity(capacity),
        }
    }

    /// Replaces the default policy. Overrides are kept.
    pub fn set_default_policy(&self, policy: Policy) -> &Self {
        let previous = self
            .include_by_default
            .swap(policy.is_include(), Ordering::AcqRel);
        if previous != policy.is_include() {
            debug!(%policy, "concurrent classifier default policy changed");
            metrics::record_default_change(CONCURRENT, policy);
        }
        self
    }

    /// Registers `item` as included, replacing any prior override.
    pub fn include(&self, item: T) -> &Self {
        self.apply(item, Policy::Include)
    }

    /// Registers `item` as excluded, replacing any prior override.
    pub fn exclude(&self, item: T) -> &Self {
        self.apply(item, Policy::Exclude)
    }

    /// Registers `item` with `policy`, replacing any prior override.
    pub fn apply(&self, item: T, policy: Policy) -> &Self {
        let previous = self.overrides.insert(item, policy);
        trace!(%policy, replaced = ?previous, "override registered");
        metrics::record_override(CONCURRENT, policy);
        self
    }

    /// Registers every item as included.
    ///
    /// Each item is a separate atomic write; readers may observe a prefix.
    pub fn include_all<I>(&self, items: I) -> &Self
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.include(item);
        }
        self
    }

    /// Registers every item as excluded.
    ///
    /// Each item is a separate atomic write; readers may observe a prefix.
    pub fn exclude_all<I>(&self, items: I) -> &Self
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
    /// Returns whether this call removed an override.
    pub fn reset(&self, item: &T) -> bool {
        let removed = self.overrides.remove(item).is_some();
        trace!(removed, "override reset");
        metrics::record_reset(CONCURRENT, removed);
        removed
    }

    /// Removes the overrides of every item.
    pub fn reset_all<'a, I>(&self, items: I) -> &Self
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
    ///
    /// Not atomic across shards: see the type-level documentation.
    pub fn clear(&self) -> &Self {
        debug!(removed = self.overrides.len(), "concurrent classifier cleared");
        self.overrides.clear();
        metrics::record_clear(CONCURRENT);
        self
    }

    /// Wraps the classifier into a view that rejects mutation.
    pub fn read_only(self) -> ReadOnlyClassifier<Self> {
        ReadOnlyClassifier::new(self)
    }
}

impl<T> ConcurrentClassifier<T>
where
    T: Eq + Hash + Clone,
{
    /// Copies the current state into a single-owner [`Classifier`].
    ///
    /// Writers running during the copy may or may not be reflected.
    pub fn snapshot(&self) -> Classifier<T> {
        let mut snapshot = Classifier::with_capacity(self.default_policy(), self.overrides.len());
        snapshot.extend(self.overrides());
        snapshot
    }
}

impl<T> Default for ConcurrentClassifier<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ConcurrentClassifier<T>
where
    T: Eq + Hash + Clone,
{
    /// Deep copy: the clone owns its own map and default policy.
    fn clone(&self) -> Self {
        Self {
            include_by_default: AtomicBool::new(
                self.include_by_default.load(Ordering::Acquire),
            ),
            overrides: self.overrides.clone(),
        }
    }
}

impl<T> fmt::Debug for ConcurrentClassifier<T>
where
    T: Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentClassifier")
            .field(
                "default_policy",
                &Policy::from(self.include_by_default.load(Ordering::Acquire)),
            )
            .field("overrides", &self.overrides)
            .finish()
    }
}

impl<T> From<Classifier<T>> for ConcurrentClassifier<T>
where
    T: Eq + Hash + Clone,
{
    fn from(classifier: Classifier<T>) -> Self {
        let concurrent =
            Self::with_capacity(classifier.default_policy(), classifier.override_count());
        for (item, policy) in classifier.overrides() {
            concurrent.apply(item, policy);
        }
        concurrent
    }
}

impl<T> From<ConcurrentClassifier<T>> for Classifier<T>
where
    T: Eq + Hash + Clone,
{
    fn from(concurrent: ConcurrentClassifier<T>) -> Self {
        let mut classifier =
            Classifier::with_capacity(concurrent.default_policy(), concurrent.override_count());
        classifier.extend(concurrent.overrides.into_iter());
        classifier
    }
}

impl<T> Classify for ConcurrentClassifier<T>
where
    T: Eq + Hash + Clone,
{
    type Item = T;

    fn default_policy(&self) -> Policy {
        Policy::from(self.include_by_default.load(Ordering::Acquire))
    }

    fn policy_of(&self, item: &T) -> Option<Policy> {
        self.overrides.get(item).map(|entry| *entry.value())
    }

    fn overrides(&self) -> Overrides<'_, T> {
        Box::new(
            self.overrides
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value())),
        )
    }

    fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl<T> ClassifyMut for ConcurrentClassifier<T>
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

/// Shared references mutate too, so a `&ConcurrentClassifier` can be handed
/// to code written against [`ClassifyMut`] from several threads at once.
impl<T> ClassifyMut for &ConcurrentClassifier<T>
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

    /// Deep copy of the shared classifier, not another handle to it.
    fn clone_box(&self) -> BoxClassifier<T> {
        Box::new((**self).clone())
    }
}

impl<T, O> PartialEq<O> for ConcurrentClassifier<T>
where
    T: Eq + Hash + Clone,
    O: Classify<Item = T> + ?Sized,
{
    fn eq(&self, other: &O) -> bool {
        observationally_eq(self, other)
    }
}

impl<T> Eq for ConcurrentClassifier<T> where T: Eq + Hash + Clone {}
