//! # Shared Store Runtime
//!
//! Runtime implementation of the shared store.
//!
//! This crate provides the [`Store`]: the single owner of a piece of
//! application state. It applies actions through a reducer, accepts partial
//! updates, and notifies selector-based subscriptions when, and only when,
//! the slice they observe changes.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, serializes updates, delivers notifications
//! - **Subscriptions**: Selector + callback pairs with value-equality change detection
//! - **`StoreConfig`**: Label and subscription warning threshold
//!
//! ## Example
//!
//! ```ignore
//! use shared_store_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Observe one slice
//! let handle = store
//!     .subscribe(|s: &AppState| s.theme, |theme| println!("theme: {theme:?}"))
//!     .await;
//!
//! // Send an action
//! store.send(AppAction::Increment).await;
//!
//! // Read state
//! let value = store.state(|s| s.counter).await;
//!
//! handle.unsubscribe();
//! ```

use shared_store_core::{action::Action, reducer::Reducer, state::State, Selection, Subscribable};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::RwLock;

/// Store configuration
pub mod config;

mod registry;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors raised while loading a [`StoreConfig`](crate::StoreConfig)
    ///
    /// Store operations themselves cannot fail: updates that do not apply
    /// (an unknown id, empty input) are no-ops, not errors.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum ConfigError {
        /// A variable was set to a value that does not parse
        #[error("Invalid value {value:?} for {var}: {reason}")]
        InvalidValue {
            /// The offending variable
            var: &'static str,
            /// The raw value found
            value: String,
            /// Why it was rejected
            reason: String,
        },

        /// The store label was set but blank
        #[error("Store label cannot be empty")]
        EmptyLabel,
    }
}

pub use config::StoreConfig;
pub use error::ConfigError;
pub use registry::SubscriptionId;

use registry::{Detach, Notification, Registry};

/// Handle returned by [`Store::subscribe`]
///
/// Calling [`unsubscribe`](Unsubscribe::unsubscribe) removes the observer;
/// its callback is never invoked again, not even for an update whose
/// notifications are being delivered at that moment. Dropping the handle
/// without calling it leaves the subscription in place.
#[must_use = "dropping the handle keeps the subscription alive; call unsubscribe() to end it"]
pub struct Unsubscribe {
    id: SubscriptionId,
    registry: Weak<dyn Detach>,
}

impl Unsubscribe {
    /// The id of the subscription this handle controls
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the subscription
    ///
    /// Returns `false` if it was already gone (the store was destroyed or
    /// dropped).
    pub fn unsubscribe(self) -> bool {
        let removed = self
            .registry
            .upgrade()
            .is_some_and(|registry| registry.detach(self.id));
        tracing::debug!(subscription = %self.id, removed, "Unsubscribed");
        removed
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}

/// Store module - the runtime for reducers and subscriptions
pub mod store {
    use super::{
        Action, Arc, Mutex, Notification, Reducer, Registry, RwLock, Selection, State,
        StoreConfig, Subscribable, Unsubscribe,
    };

    /// The Store - single owner of application state
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (state transitions)
    /// 3. Environment (injected dependencies)
    /// 4. Subscriptions (selector, callback, last observed slice)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// # Update Ordering
    ///
    /// Every update (`send`, `set_state`, `merge`, `replace_state`) runs under
    /// a fair dispatch lock, so updates apply in the order they were issued and
    /// each one's notifications are delivered before the next update starts.
    /// `subscribe_with` queues behind the same lock, so a new subscriber's
    /// baseline is never overtaken by a concurrent update.
    /// Callbacks run after the state lock is released; they may read the
    /// store from another task but must not block waiting on an update of the
    /// same store.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(AppState::default(), AppReducer::new(), env);
    ///
    /// store.send(AppAction::AddTodo { text: "buy milk".into() }).await;
    /// ```
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        initial_state: Arc<S>,
        reducer: R,
        environment: E,
        subscriptions: Arc<Mutex<Registry<S>>>,
        dispatch: Arc<tokio::sync::Mutex<()>>,
        config: Arc<StoreConfig>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        S: State + Clone + Send + Sync + 'static,
        A: Action + Send + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        ///
        /// # Example
        ///
        /// ```ignore
        /// let config = StoreConfig::default().with_label("dashboard");
        /// let store = Store::with_config(AppState::default(), AppReducer::new(), env, config);
        /// ```
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            tracing::debug!(store = %config.label, "Creating store");

            Self {
                state: Arc::new(RwLock::new(initial_state.clone())),
                initial_state: Arc::new(initial_state),
                reducer,
                environment,
                subscriptions: Arc::new(Mutex::new(Registry::new(config.label.clone()))),
                dispatch: Arc::new(tokio::sync::Mutex::new(())),
                config: Arc::new(config),
            }
        }

        /// The configuration this store was built with
        #[must_use]
        pub fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// The environment handed to the reducer
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action to the store
        ///
        /// 1. Waits for earlier updates to finish
        /// 2. Calls the reducer with (state, action, environment) under the write lock
        /// 3. Notifies every subscription whose slice changed
        ///
        /// Returns after all notifications for this action were delivered.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        /// Reducers should be pure functions that do not panic.
        #[tracing::instrument(
            skip_all,
            name = "store_send",
            fields(store = %self.config.label, action = action.name())
        )]
        pub async fn send(&self, action: A) {
            tracing::debug!("Processing action");
            metrics::counter!(
                "store.actions.total",
                "store" => self.config.label.clone(),
                "action" => action.name()
            )
            .increment(1);

            self.apply(|state| {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                self.reducer.reduce(state, action, &self.environment);
                metrics::histogram!(
                    "store.reducer.duration_seconds",
                    "store" => self.config.label.clone()
                )
                .record(start.elapsed().as_secs_f64());
            })
            .await;
        }

        /// Update state from a patch computed from the current state
        ///
        /// Fields absent from the patch keep their value. Subscriptions whose
        /// slice is unchanged by value are not notified.
        ///
        /// # Example
        ///
        /// ```ignore
        /// store
        ///     .set_state(|s| AppStatePatch::default().with_counter(s.counter * 2))
        ///     .await;
        /// ```
        #[tracing::instrument(skip_all, name = "store_set_state", fields(store = %self.config.label))]
        pub async fn set_state<F>(&self, updater: F)
        where
            F: FnOnce(&S) -> S::Patch,
        {
            self.apply(|state| {
                let patch = updater(state);
                state.merge(patch);
            })
            .await;
        }

        /// Update state from a ready-made patch
        pub async fn merge(&self, patch: S::Patch) {
            self.set_state(move |_| patch).await;
        }

        /// Replace the whole state
        ///
        /// Notification follows the same value-equality rule as
        /// [`set_state`](Self::set_state).
        #[tracing::instrument(skip_all, name = "store_replace_state", fields(store = %self.config.label))]
        pub async fn replace_state(&self, next: S) {
            self.apply(move |state| *state = next).await;
        }

        /// Read current state via a closure
        ///
        /// Access state through a closure to ensure the lock is released promptly:
        ///
        /// ```ignore
        /// let todo_count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Clone of the current state
        pub async fn snapshot(&self) -> S {
            self.state(S::clone).await
        }

        /// The state this store was created with
        #[must_use]
        pub fn initial_state(&self) -> S {
            S::clone(&self.initial_state)
        }

        /// Observe the slice `select` returns, calling `on_change` whenever it
        /// changes by `PartialEq`
        ///
        /// # Example
        ///
        /// ```ignore
        /// let handle = store
        ///     .subscribe(|s: &AppState| s.counter, |count| println!("count = {count}"))
        ///     .await;
        /// ```
        pub async fn subscribe<T, F, C>(&self, select: F, on_change: C) -> Unsubscribe
        where
            T: PartialEq + Clone + Send + 'static,
            F: Fn(&S) -> T + Send + Sync + 'static,
            C: Fn(&T) + Send + Sync + 'static,
        {
            self.subscribe_with(Selection::new(select, on_change)).await
        }

        /// Register an explicit [`Subscribable`]
        ///
        /// The slice is selected once at registration; that value is the
        /// baseline for the first change check. If the subscriber
        /// [fires immediately](Subscribable::fires_immediately), `on_change`
        /// is called with the baseline before this returns.
        ///
        /// Registration takes its turn behind pending updates, so an update
        /// issued meanwhile is delivered after the baseline, never before.
        pub async fn subscribe_with<X>(&self, subscriber: X) -> Unsubscribe
        where
            X: Subscribable<S>,
        {
            let _dispatch = self.dispatch.lock().await;
            let subscriber = Arc::new(subscriber);

            let (id, initial, active) = {
                let state = self.state.read().await;
                let initial = subscriber.select(&*state);
                let mut registry = self.lock_subscriptions();
                let id = registry.insert(Arc::clone(&subscriber), initial.clone());
                let active = registry.len();
                (id, initial, active)
            };

            tracing::debug!(store = %self.config.label, subscription = %id, active, "Subscribed");
            if active > self.config.subscription_warn_threshold {
                tracing::warn!(
                    store = %self.config.label,
                    active,
                    threshold = self.config.subscription_warn_threshold,
                    "Subscription count above threshold, views may be leaking subscriptions"
                );
            }

            if subscriber.fires_immediately() {
                subscriber.on_change(&initial);
            }

            // Coerce to the state-independent removal interface
            let registry: Arc<dyn super::Detach> = self.subscriptions.clone();
            Unsubscribe {
                id,
                registry: Arc::downgrade(&registry),
            }
        }

        /// Number of live subscriptions
        #[must_use]
        pub fn subscription_count(&self) -> usize {
            self.lock_subscriptions().len()
        }

        /// Remove every subscription
        ///
        /// Outstanding [`Unsubscribe`] handles report `false` afterwards.
        /// Returns how many subscriptions were removed.
        pub fn destroy(&self) -> usize {
            let removed = self.lock_subscriptions().clear();
            tracing::debug!(store = %self.config.label, removed, "Store subscriptions cleared");
            removed
        }

        /// Run `mutate` as one serialized update and deliver its notifications
        async fn apply<F>(&self, mutate: F)
        where
            F: FnOnce(&mut S),
        {
            let _dispatch = self.dispatch.lock().await;

            let notifications = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                mutate(&mut *state);

                let state = state.downgrade();
                let notifications = self.lock_subscriptions().collect(&*state);
                notifications
            };

            metrics::counter!("store.updates.total", "store" => self.config.label.clone())
                .increment(1);
            self.deliver(notifications);
        }

        fn deliver(&self, notifications: Vec<Notification>) {
            if notifications.is_empty() {
                tracing::trace!("No subscription affected");
                return;
            }

            tracing::debug!(count = notifications.len(), "Delivering notifications");
            metrics::counter!("store.notifications.total", "store" => self.config.label.clone())
                .increment(notifications.len() as u64);

            for notify in notifications {
                notify();
            }
        }

        fn lock_subscriptions(&self) -> std::sync::MutexGuard<'_, Registry<S>> {
            self.subscriptions
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                initial_state: Arc::clone(&self.initial_state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                subscriptions: Arc::clone(&self.subscriptions),
                dispatch: Arc::clone(&self.dispatch),
                config: Arc::clone(&self.config),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
