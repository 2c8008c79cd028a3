//! Dashboard state shared by a counter view, a todo view and a status view.
//!
//! One [`AppStore`] owns an [`AppState`]. Views subscribe to the slice they
//! render and are called back only when that slice changes; the named
//! actions on [`AppActions`] are the only way the views change state.
//!
//! # Example
//!
//! ```no_run
//! use dashboard::{app_store, AppActions, Theme};
//!
//! # async fn example() {
//! let store = app_store();
//!
//! let handle = store
//!     .subscribe(|s: &dashboard::AppState| s.theme, |theme: &Theme| println!("theme: {theme}"))
//!     .await;
//!
//! store.increment().await; // theme unchanged, no callback
//! store.set_theme(Theme::Dark).await; // prints "theme: dark"
//!
//! handle.unsubscribe();
//! # }
//! ```

pub mod actions;
pub mod reducer;
pub mod types;
pub mod views;

pub use actions::{AppAction, AppActions};
pub use reducer::{AppEnvironment, AppReducer};
pub use types::{AppState, AppStatePatch, ParseThemeError, Theme, TodoId, TodoItem};
pub use views::{CounterView, StatusSlice, StatusView, TodoView};

use shared_store_runtime::{Store, StoreConfig};

/// The store type the dashboard runs on
pub type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

/// Creates a store at the start state with sequential ids and default config
#[must_use]
pub fn app_store() -> AppStore {
    app_store_with(AppEnvironment::sequential(), StoreConfig::default())
}

/// Creates a store at the start state with the given environment and config
#[must_use]
pub fn app_store_with(env: AppEnvironment, config: StoreConfig) -> AppStore {
    Store::with_config(AppState::new(), AppReducer::new(), env, config)
}
