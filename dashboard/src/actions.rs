//! Actions and the named-action API.

use crate::types::{AppStatePatch, Theme, TodoId};
use crate::AppStore;
use serde::{Deserialize, Serialize};
use shared_store_macros::Action;
use std::future::Future;

/// Every state transition the views can request
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppAction {
    /// counter += 1
    Increment,
    /// counter -= 1, no lower bound
    Decrement,
    /// Append a todo with the trimmed text; ignored when the text is blank
    AddTodo {
        /// Text as typed
        text: String,
    },
    /// Flip `completed` on the matching todo
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },
    /// Remove the matching todo
    RemoveTodo {
        /// Todo to remove
        id: TodoId,
    },
    /// Replace the theme
    SetTheme {
        /// New theme
        theme: Theme,
    },
}

/// Named actions on an [`AppStore`]
///
/// Each method resolves once the state was updated and every affected
/// subscription notified.
///
/// # Example
///
/// ```no_run
/// use dashboard::{app_store, AppActions};
///
/// # async fn example() {
/// let store = app_store();
/// store.increment().await;
/// store.add_todo("buy milk").await;
/// assert_eq!(store.state(|s| s.counter).await, 1);
/// # }
/// ```
pub trait AppActions {
    /// counter += 1
    fn increment(&self) -> impl Future<Output = ()> + Send;

    /// counter -= 1
    fn decrement(&self) -> impl Future<Output = ()> + Send;

    /// Append a todo; blank text is ignored
    fn add_todo(&self, text: impl Into<String>) -> impl Future<Output = ()> + Send;

    /// Flip `completed` on `id`; unknown ids are ignored
    fn toggle_todo(&self, id: TodoId) -> impl Future<Output = ()> + Send;

    /// Remove `id`; unknown ids are ignored
    fn remove_todo(&self, id: TodoId) -> impl Future<Output = ()> + Send;

    /// Replace the theme
    fn set_theme(&self, theme: Theme) -> impl Future<Output = ()> + Send;

    /// Switch to the other theme, reading and writing in one update
    fn toggle_theme(&self) -> impl Future<Output = ()> + Send;
}

impl AppActions for AppStore {
    fn increment(&self) -> impl Future<Output = ()> + Send {
        self.send(AppAction::Increment)
    }

    fn decrement(&self) -> impl Future<Output = ()> + Send {
        self.send(AppAction::Decrement)
    }

    fn add_todo(&self, text: impl Into<String>) -> impl Future<Output = ()> + Send {
        self.send(AppAction::AddTodo { text: text.into() })
    }

    fn toggle_todo(&self, id: TodoId) -> impl Future<Output = ()> + Send {
        self.send(AppAction::ToggleTodo { id })
    }

    fn remove_todo(&self, id: TodoId) -> impl Future<Output = ()> + Send {
        self.send(AppAction::RemoveTodo { id })
    }

    fn set_theme(&self, theme: Theme) -> impl Future<Output = ()> + Send {
        self.send(AppAction::SetTheme { theme })
    }

    fn toggle_theme(&self) -> impl Future<Output = ()> + Send {
        self.set_state(|state| AppStatePatch::default().with_theme(state.theme.toggled()))
    }
}
