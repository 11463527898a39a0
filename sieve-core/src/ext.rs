//! Batch queries over sequences of items.
//!
//! Every method here is a short-circuiting fold over the single-item
//! queries of [`Classify`], so it behaves identically for every classifier
//! kind, including trait objects.
//!
//! ```
//! use sieve_core::{ClassifyExt, Classify, Overrides, Policy};
//!
//! struct Evens;
//!
//! impl Classify for Evens {
//!     type Item = u32;
//!     fn default_policy(&self) -> Policy { Policy::Exclude }
//!     fn policy_of(&self, item: &u32) -> Option<Policy> {
//!         (item % 2 == 0).then_some(Policy::Include)
//!     }
//!     fn overrides(&self) -> Overrides<'_, u32> { Box::new(std::iter::empty()) }
//!     fn override_count(&self) -> usize { 0 }
//! }
//!
//! assert!(Evens.any_included([1u32, 3, 4]));
//! assert!(!Evens.should_pass([2u32, 3]));
//! assert_eq!(Evens.included(1u32..=6).collect::<Vec<_>>(), vec![2, 4, 6]);
//! ```

use std::borrow::Borrow;

use crate::classify::Classify;

/// Batch queries for any [`Classify`] implementation.
///
/// Items may be passed by value or by reference: any sequence whose
/// elements borrow as [`Classify::Item`] is accepted.
pub trait ClassifyExt: Classify {
    /// Whether at least one item should be included.
    fn any_included<I>(&self, items: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        items
            .into_iter()
            .any(|item| self.should_include(item.borrow()))
    }

    /// Whether at least one item should be excluded.
    fn any_excluded<I>(&self, items: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        items
            .into_iter()
            .any(|item| self.should_exclude(item.borrow()))
    }

    /// Whether at least one item carries an include override.
    fn any_explicit_included<I>(&self, items: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        items
            .into_iter()
            .any(|item| self.is_explicitly_included(item.borrow()))
    }

    /// Whether at least one item carries an exclude override.
    fn any_explicit_excluded<I>(&self, items: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        items
            .into_iter()
            .any(|item| self.is_explicitly_excluded(item.borrow()))
    }

    /// Whether every item should be included.
    ///
    /// An empty sequence passes.
    fn should_pass<I>(&self, items: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        !self.any_excluded(items)
    }

    /// Whether at least one item should be excluded.
    ///
    /// Complement of [`should_pass`](Self::should_pass); an empty sequence
    /// never fails.
    fn should_fail<I>(&self, items: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        self.any_excluded(items)
    }

    /// Keeps the items that should be included, preserving their order.
    fn included<I>(&self, items: I) -> impl Iterator<Item = I::Item>
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        items
            .into_iter()
            .filter(move |item| self.should_include(item.borrow()))
    }

    /// Keeps the items that should be excluded, preserving their order.
    fn excluded<I>(&self, items: I) -> impl Iterator<Item = I::Item>
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        items
            .into_iter()
            .filter(move |item| self.should_exclude(item.borrow()))
    }
}

impl<C> ClassifyExt for C where C: Classify + ?Sized {}
