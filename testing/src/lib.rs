//! # Shared Store Testing
//!
//! Testing utilities and helpers for the shared store.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - A recorder that captures subscription notifications
//! - proptest strategies for common inputs
//!
//! ## Example
//!
//! ```ignore
//! use shared_store_testing::Recorder;
//!
//! #[tokio::test]
//! async fn test_theme_view() {
//!     let store = app_store();
//!     let themes = Recorder::new();
//!     let _handle = store.subscribe(|s: &AppState| s.theme, themes.callback()).await;
//!
//!     store.send(AppAction::SetTheme(Theme::Dark)).await;
//!
//!     assert_eq!(themes.values(), vec![Theme::Dark]);
//! }
//! ```

use shared_store_core::environment::IdGenerator;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};


/// Deterministic implementations of Environment traits
pub mod mocks {
    use super::{IdGenerator, Mutex, VecDeque};

    /// Id generator that hands out a fixed script of ids
    ///
    /// Once the script runs out it continues counting up from the largest
    /// scripted id, so it never stalls a reducer that keeps drawing.
    ///
    /// # Example
    ///
    /// ```
    /// use shared_store_testing::mocks::ScriptedIdGenerator;
    /// use shared_store_core::environment::IdGenerator;
    ///
    /// let ids = ScriptedIdGenerator::new([7, 7, 9]);
    /// assert_eq!(ids.next_id(), 7);
    /// assert_eq!(ids.next_id(), 7);
    /// assert_eq!(ids.next_id(), 9);
    /// assert_eq!(ids.next_id(), 10);
    /// ```
    #[derive(Debug)]
    pub struct ScriptedIdGenerator {
        inner: Mutex<Script>,
    }

    #[derive(Debug)]
    struct Script {
        pending: VecDeque<u64>,
        high_water: u64,
    }

    impl ScriptedIdGenerator {
        /// Create a generator that yields `ids` in order
        #[must_use]
        pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
            Self {
                inner: Mutex::new(Script {
                    pending: ids.into_iter().collect(),
                    high_water: 0,
                }),
            }
        }
    }

    impl IdGenerator for ScriptedIdGenerator {
        fn next_id(&self) -> u64 {
            let mut script = self
                .inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let id = script
                .pending
                .pop_front()
                .unwrap_or_else(|| script.high_water + 1);
            script.high_water = script.high_water.max(id);
            id
        }
    }

    /// Id generator that always returns the same id
    ///
    /// Useful to prove that a reducer does not trust its generator blindly.
    #[derive(Debug, Clone, Copy)]
    pub struct ConstantIdGenerator(pub u64);

    impl IdGenerator for ConstantIdGenerator {
        fn next_id(&self) -> u64 {
            self.0
        }
    }
}

/// Captures values delivered to a subscription callback
///
/// Clones share the same buffer, so one clone can be moved into the callback
/// while the test keeps another.
#[derive(Debug)]
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T> Recorder<T> {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A callback that appends every value it is given
    #[must_use]
    pub fn callback(&self) -> impl Fn(&T) + Send + Sync + 'static
    where
        T: Clone + Send + 'static,
    {
        let values = Arc::clone(&self.values);
        move |value: &T| {
            values
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(value.clone());
        }
    }

    /// Everything recorded so far, oldest first
    #[must_use]
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock().clone()
    }

    /// The most recent value
    #[must_use]
    pub fn last(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lock().last().cloned()
    }

    /// Number of recorded calls
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Property-based testing utilities using proptest
pub mod properties {
    use proptest::prelude::*;

    /// Text with at least one non-whitespace character, optionally padded
    /// with surrounding whitespace
    pub fn padded_text() -> impl Strategy<Value = String> {
        ("[ \t]{0,3}", "[a-z][a-z0-9 ]{0,15}[a-z0-9]?", "[ \t]{0,3}")
            .prop_map(|(lead, body, trail)| format!("{lead}{body}{trail}"))
    }

    /// Text made only of whitespace (possibly empty)
    pub fn blank_text() -> impl Strategy<Value = String> {
        "[ \t\n]{0,6}"
    }
}

/// Install a test-friendly tracing subscriber
///
/// Output goes through the test harness so it is only shown for failing
/// tests. Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shared_store_runtime=trace".into()),
        )
        .with_test_writer()
        .try_init();
}

pub use mocks::{ConstantIdGenerator, ScriptedIdGenerator};
pub use reducer_test::ReducerTest;
