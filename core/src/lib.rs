//! # Shared Store Core
//!
//! Core traits and types for the shared store.
//!
//! This crate provides the abstractions a [`Store`] runtime is built from. It
//! contains no runtime machinery of its own, so domain crates can implement
//! and unit-test their state transitions without an async executor.
//!
//! ## Core Concepts
//!
//! - **State**: The application state, mergeable from a partial patch
//! - **Action**: A named state transition
//! - **Reducer**: `(State, Action, Environment) → State`, applied in place
//! - **Environment**: Injected dependencies (id generation)
//! - **Subscribable**: A selector plus change callback observing one slice of state
//!
//! ## Example
//!
//! ```ignore
//! use shared_store_core::*;
//!
//! #[derive(State, Clone, Debug, Default)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Action, Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut CounterState, action: CounterAction, _env: &()) {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!     }
//! }
//! ```
//!
//! [`Store`]: https://docs.rs/shared-store-runtime

/// Selector-based subscriptions
pub mod subscription;

/// Action module - named state transitions
///
/// Actions are plain enums. The only requirement the runtime places on them is
/// a stable, human-readable name for logs and metrics, which
/// `#[derive(Action)]` generates from the variant name.
pub mod action {
    /// A named state transition
    pub trait Action {
        /// The variant name of this action (e.g. `"AddTodo"`)
        fn name(&self) -> &'static str;
    }
}

/// State module - mergeable application state
///
/// A state type declares a `Patch` type: the partial form of itself where each
/// field may or may not be present. Merging a patch overwrites exactly the
/// fields the patch carries and leaves the rest untouched.
pub mod state {
    /// Application state that can absorb a partial update
    ///
    /// Usually derived with `#[derive(State)]`, which generates a
    /// `<Name>Patch` struct holding one `Option` per field.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut state = AppState::default();
    /// state.merge(AppStatePatch::default().with_counter(3));
    /// assert_eq!(state.counter, 3);
    /// ```
    pub trait State {
        /// Partial form of this state
        type Patch: Default;

        /// Overwrite every field present in `patch`
        fn merge(&mut self, patch: Self::Patch);
    }
}

/// Reducer module - the core trait for business logic
///
/// Reducers are deterministic functions of `(State, Action, Environment)`. They
/// mutate the state they are handed and never perform I/O; anything
/// nondeterministic (such as id generation) comes from the environment.
pub mod reducer {
    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for AppReducer {
    ///     type State = AppState;
    ///     type Action = AppAction;
    ///     type Environment = AppEnvironment;
    ///
    ///     fn reduce(&self, state: &mut AppState, action: AppAction, env: &AppEnvironment) {
    ///         match action {
    ///             AppAction::Increment => state.counter += 1,
    ///             // ...
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Apply an action to the state in place
        ///
        /// Actions whose preconditions do not hold (an unknown id, empty
        /// input) must leave the state untouched.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        );
    }
}

/// Environment module - dependency injection traits
///
/// All nondeterminism a reducer needs is abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Source of unique numeric identifiers
    ///
    /// # Examples
    ///
    /// ```
    /// use shared_store_core::environment::{IdGenerator, SequentialIdGenerator};
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.next_id(), 1);
    /// assert_eq!(ids.next_id(), 2);
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Produce the next identifier
        fn next_id(&self) -> u64;
    }

    /// Monotonic counter, never repeats within a process
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose first id is 1
        #[must_use]
        pub const fn new() -> Self {
            Self::starting_at(1)
        }

        /// Create a generator whose first id is `first`
        #[must_use]
        pub const fn starting_at(first: u64) -> Self {
            Self {
                next: AtomicU64::new(first),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> u64 {
            self.next.fetch_add(1, Ordering::Relaxed)
        }
    }
}

pub use action::Action;
pub use environment::{IdGenerator, SequentialIdGenerator};
pub use reducer::Reducer;
pub use state::State;
pub use subscription::{Selection, Subscribable};
