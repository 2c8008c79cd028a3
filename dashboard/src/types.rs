//! Domain types for the dashboard.
//!
//! One `AppState` holds everything the three views read: a counter, an
//! ordered todo list and the active theme.

use serde::{Deserialize, Serialize};
use shared_store_macros::State;
use thiserror::Error;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// What to do; never blank
    pub text: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new, not yet completed, todo item
    #[must_use]
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Flips the completed flag
    pub const fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Color theme shared by all views
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background, dark text
    #[default]
    Light,
    /// Dark background, light text
    Dark,
}

impl Theme {
    /// The other theme
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Lowercase name, as serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no theme
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown theme {0:?} (expected \"light\" or \"dark\")")]
pub struct ParseThemeError(pub String);

impl std::str::FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(ParseThemeError(s.to_string())),
        }
    }
}

/// The whole application state
///
/// `#[derive(State)]` generates [`AppStatePatch`], the partial form used by
/// `Store::set_state`.
#[derive(State, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Shared counter, may go negative; stays put at `i64::MIN`/`i64::MAX`
    /// instead of wrapping
    pub counter: i64,
    /// Todo items in insertion order; ids are unique
    pub todos: Vec<TodoItem>,
    /// Active theme
    pub theme: Theme,
}

impl AppState {
    /// Creates the start state: counter 0, no todos, light theme
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn todo(&self, id: TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn contains_todo(&self, id: TodoId) -> bool {
        self.todo(id).is_some()
    }

    /// Returns the number of todos
    #[must_use]
    pub fn todo_count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Returns the number of todos still open
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.todo_count() - self.completed_count()
    }
}
