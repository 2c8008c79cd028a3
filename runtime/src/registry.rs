//! Subscription bookkeeping.
//!
//! Each entry pairs a subscriber with the last slice it was shown. After an
//! update the store asks every entry to re-select; entries whose slice differs
//! hand back a ready-to-run notification. Notifications run after the registry
//! and state locks are released, so callbacks may unsubscribe freely. A
//! notification whose subscription was removed before it ran is dropped.

use shared_store_core::Subscribable;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A deferred `on_change` call
pub(crate) type Notification = Box<dyn FnOnce() + Send>;

/// Identifies one registered subscription within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// The raw numeric id
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Type-erased subscriber with its last observed slice
trait Observer<S>: Send {
    fn observe(&mut self, state: &S) -> Option<Notification>;

    /// Stop any notification already handed out from reaching the subscriber
    fn retire(&self);
}

struct Tracked<S, X: Subscribable<S>> {
    subscriber: Arc<X>,
    last: X::Slice,
    live: Arc<AtomicBool>,
    _state: PhantomData<fn(&S)>,
}

impl<S, X> Observer<S> for Tracked<S, X>
where
    S: 'static,
    X: Subscribable<S>,
{
    fn observe(&mut self, state: &S) -> Option<Notification> {
        let current = self.subscriber.select(state);
        if self.subscriber.is_same(&self.last, &current) {
            return None;
        }

        self.last = current.clone();
        let subscriber = Arc::clone(&self.subscriber);
        let live = Arc::clone(&self.live);
        Some(Box::new(move || {
            if live.load(Ordering::Acquire) {
                subscriber.on_change(&current);
            }
        }))
    }

    fn retire(&self) {
        self.live.store(false, Ordering::Release);
    }
}

/// All live subscriptions of one store, in registration order
pub(crate) struct Registry<S> {
    label: String,
    next_id: u64,
    observers: BTreeMap<SubscriptionId, Box<dyn Observer<S>>>,
}

impl<S: 'static> Registry<S> {
    pub(crate) const fn new(label: String) -> Self {
        Self {
            label,
            next_id: 1,
            observers: BTreeMap::new(),
        }
    }

    /// Register `subscriber`, remembering `initial` as its current slice
    pub(crate) fn insert<X>(&mut self, subscriber: Arc<X>, initial: X::Slice) -> SubscriptionId
    where
        X: Subscribable<S>,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        self.observers.insert(
            id,
            Box::new(Tracked {
                subscriber,
                last: initial,
                live: Arc::new(AtomicBool::new(true)),
                _state: PhantomData,
            }),
        );
        self.record_size();
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let Some(observer) = self.observers.remove(&id) else {
            return false;
        };
        observer.retire();
        self.record_size();
        true
    }

    pub(crate) fn clear(&mut self) -> usize {
        let count = self.observers.len();
        for observer in self.observers.values() {
            observer.retire();
        }
        self.observers.clear();
        self.record_size();
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Re-select every slice against `state` and collect the changed ones
    pub(crate) fn collect(&mut self, state: &S) -> Vec<Notification> {
        self.observers
            .values_mut()
            .filter_map(|observer| observer.observe(state))
            .collect()
    }

    fn record_size(&self) {
        // Note: Precision loss acceptable for metrics (subscription counts < 2^52)
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("store.subscriptions.active", "store" => self.label.clone())
            .set(self.observers.len() as f64);
    }
}

/// Removal side of a registry, independent of the state type
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId) -> bool;
}

impl<S: 'static> Detach for Mutex<Registry<S>> {
    fn detach(&self, id: SubscriptionId) -> bool {
        self.lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_store_core::Selection;
    use std::sync::atomic::AtomicUsize;

    fn counting(calls: &Arc<AtomicUsize>) -> impl Fn(&i32) + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        move |_: &i32| {
            calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut registry = Registry::<(i32, i32)>::new("test".to_string());
        let a = registry.insert(Arc::new(Selection::new(|s: &(i32, i32)| s.0, |_: &i32| {})), 0);
        let b = registry.insert(Arc::new(Selection::new(|s: &(i32, i32)| s.1, |_: &i32| {})), 0);
        assert_eq!(a.as_u64() + 1, b.as_u64());
        assert_eq!(registry.len(), 2);
        assert_eq!(a.to_string(), format!("sub-{}", a.as_u64()));
    }

    #[test]
    fn test_collect_only_changed_slices() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let mut registry = Registry::<(i32, i32)>::new("test".to_string());
        registry.insert(Arc::new(Selection::new(|s: &(i32, i32)| s.0, counting(&first))), 0);
        registry.insert(Arc::new(Selection::new(|s: &(i32, i32)| s.1, counting(&second))), 0);

        let notifications = registry.collect(&(1, 0));
        assert_eq!(notifications.len(), 1);
        for notify in notifications {
            notify();
        }

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        // Same state again: nothing changed since the last delivery
        assert!(registry.collect(&(1, 0)).is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut registry = Registry::<i32>::new("test".to_string());
        let id = registry.insert(Arc::new(Selection::new(|s: &i32| *s, |_: &i32| {})), 0);
        registry.insert(Arc::new(Selection::new(|s: &i32| *s, |_: &i32| {})), 0);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert_eq!(registry.clear(), 1);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_pending_notification_dropped_after_remove() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::<i32>::new("test".to_string());
        let id = registry.insert(Arc::new(Selection::new(|s: &i32| *s, counting(&calls))), 0);
        registry.insert(Arc::new(Selection::new(|s: &i32| *s, counting(&calls))), 0);

        let notifications = registry.collect(&1);
        assert_eq!(notifications.len(), 2);
        assert!(registry.remove(id));
        for notify in notifications {
            notify();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pending_notifications_dropped_after_clear() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::<i32>::new("test".to_string());
        registry.insert(Arc::new(Selection::new(|s: &i32| *s, counting(&calls))), 0);

        let notifications = registry.collect(&1);
        registry.clear();
        for notify in notifications {
            notify();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_detach_through_mutex() {
        let registry = Mutex::new(Registry::<i32>::new("test".to_string()));
        let id = registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(Arc::new(Selection::new(|s: &i32| *s, |_: &i32| {})), 0);

        assert!(registry.detach(id));
        assert!(!registry.detach(id));
    }
}
