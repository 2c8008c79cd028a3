//! Selector-based subscriptions.
//!
//! An observer does not watch the whole state. It names a slice through a
//! selector, and the store calls it back only when that slice changes by
//! value. [`Subscribable`] is the capability a store needs from an observer;
//! [`Selection`] builds one from a pair of closures.

use std::marker::PhantomData;
use std::sync::Arc;

/// An observer of one slice of state `S`
///
/// The store keeps the last slice it delivered (or observed at registration)
/// and, after every update, re-selects and compares with [`is_same`]. Only a
/// difference triggers [`on_change`].
///
/// [`is_same`]: Subscribable::is_same
/// [`on_change`]: Subscribable::on_change
///
/// # Example
///
/// ```
/// use shared_store_core::Subscribable;
///
/// struct ThemeLogger;
///
/// impl Subscribable<(i64, bool)> for ThemeLogger {
///     type Slice = bool;
///
///     fn select(&self, state: &(i64, bool)) -> bool {
///         state.1
///     }
///
///     fn on_change(&self, dark: &bool) {
///         println!("dark mode: {dark}");
///     }
///
///     fn is_same(&self, previous: &bool, current: &bool) -> bool {
///         previous == current
///     }
/// }
/// ```
pub trait Subscribable<S>: Send + Sync + 'static {
    /// The projected slice of state
    type Slice: Clone + Send + 'static;

    /// Project the slice this observer cares about
    fn select(&self, state: &S) -> Self::Slice;

    /// Called with the new slice after it changed
    fn on_change(&self, slice: &Self::Slice);

    /// Value-equality used to decide whether the slice changed
    fn is_same(&self, previous: &Self::Slice, current: &Self::Slice) -> bool;

    /// Whether the current slice is delivered once right after registration
    fn fires_immediately(&self) -> bool {
        false
    }
}

impl<S, X> Subscribable<S> for Arc<X>
where
    X: Subscribable<S> + ?Sized,
{
    type Slice = X::Slice;

    fn select(&self, state: &S) -> Self::Slice {
        (**self).select(state)
    }

    fn on_change(&self, slice: &Self::Slice) {
        (**self).on_change(slice);
    }

    fn is_same(&self, previous: &Self::Slice, current: &Self::Slice) -> bool {
        (**self).is_same(previous, current)
    }

    fn fires_immediately(&self) -> bool {
        (**self).fires_immediately()
    }
}

/// A [`Subscribable`] assembled from closures
///
/// Compares slices with `PartialEq` unless [`with_equality`] supplies
/// another function.
///
/// [`with_equality`]: Selection::with_equality
///
/// # Example
///
/// ```
/// use shared_store_core::{Selection, Subscribable};
///
/// let selection = Selection::new(
///     |state: &Vec<String>| state.len(),
///     |len: &usize| println!("{len} items"),
/// )
/// .fire_immediately();
///
/// assert!(selection.fires_immediately());
/// assert_eq!(selection.select(&vec!["a".to_string()]), 1);
/// ```
pub struct Selection<S, T, F, C, Q = fn(&T, &T) -> bool> {
    select: F,
    on_change: C,
    is_same: Q,
    fire_immediately: bool,
    _state: PhantomData<fn(&S) -> T>,
}

impl<S, T, F, C> Selection<S, T, F, C>
where
    T: PartialEq,
    F: Fn(&S) -> T,
    C: Fn(&T),
{
    /// Observe `select(state)` and call `on_change` when it differs by `==`
    #[must_use]
    pub fn new(select: F, on_change: C) -> Self {
        Self {
            select,
            on_change,
            is_same: <T as PartialEq>::eq,
            fire_immediately: false,
            _state: PhantomData,
        }
    }
}

impl<S, T, F, C, Q> Selection<S, T, F, C, Q> {
    /// Replace the equality used to detect a change
    ///
    /// `is_same(previous, current)` returning `true` suppresses the callback.
    #[must_use]
    pub fn with_equality<Q2>(self, is_same: Q2) -> Selection<S, T, F, C, Q2>
    where
        Q2: Fn(&T, &T) -> bool,
    {
        Selection {
            select: self.select,
            on_change: self.on_change,
            is_same,
            fire_immediately: self.fire_immediately,
            _state: PhantomData,
        }
    }

    /// Deliver the current slice once when the subscription is registered
    #[must_use]
    pub const fn fire_immediately(mut self) -> Self {
        self.fire_immediately = true;
        self
    }
}

impl<S, T, F, C, Q> Subscribable<S> for Selection<S, T, F, C, Q>
where
    S: 'static,
    T: Clone + Send + 'static,
    F: Fn(&S) -> T + Send + Sync + 'static,
    C: Fn(&T) + Send + Sync + 'static,
    Q: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    type Slice = T;

    fn select(&self, state: &S) -> T {
        (self.select)(state)
    }

    fn on_change(&self, slice: &T) {
        (self.on_change)(slice);
    }

    fn is_same(&self, previous: &T, current: &T) -> bool {
        (self.is_same)(previous, current)
    }

    fn fires_immediately(&self) -> bool {
        self.fire_immediately
    }
}

impl<S, T, F, C, Q> std::fmt::Debug for Selection<S, T, F, C, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("fire_immediately", &self.fire_immediately)
            .finish_non_exhaustive()
    }
}
