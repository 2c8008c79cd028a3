//! Reducer for the dashboard state.

use crate::actions::AppAction;
use crate::types::{AppState, TodoId, TodoItem};
use shared_store_core::{
    environment::{IdGenerator, SequentialIdGenerator},
    reducer::Reducer,
};
use std::collections::HashSet;
use std::sync::Arc;

/// How many times the reducer asks the generator for an unused id before
/// picking the smallest free one itself
const MAX_ID_DRAWS: usize = 16;

/// Dependencies injected into [`AppReducer`]
#[derive(Clone)]
pub struct AppEnvironment {
    /// Source of todo ids
    pub ids: Arc<dyn IdGenerator>,
}

impl AppEnvironment {
    /// Creates an environment around the given id generator
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// Creates an environment whose ids count up from 1
    #[must_use]
    pub fn sequential() -> Self {
        Self::new(Arc::new(SequentialIdGenerator::new()))
    }
}

impl Default for AppEnvironment {
    fn default() -> Self {
        Self::sequential()
    }
}

impl std::fmt::Debug for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the counter, the todo list and the theme
#[derive(Clone, Copy, Debug, Default)]
pub struct AppReducer;

impl AppReducer {
    /// Creates a new `AppReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Draws an id that no todo in `state` uses
    fn fresh_id(state: &AppState, env: &AppEnvironment) -> TodoId {
        for _ in 0..MAX_ID_DRAWS {
            let id = TodoId::new(env.ids.next_id());
            if !state.contains_todo(id) {
                return id;
            }
            tracing::debug!(%id, "Generated todo id already in use, drawing again");
        }

        let used: HashSet<u64> = state.todos.iter().map(|t| t.id.as_u64()).collect();
        let id = (1_u64..)
            .find(|candidate| !used.contains(candidate))
            .map_or_else(|| TodoId::new(u64::MAX), TodoId::new);
        tracing::warn!(%id, "Id generator kept colliding, using smallest free id");
        id
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(&self, state: &mut AppState, action: AppAction, env: &AppEnvironment) {
        match action {
            AppAction::Increment => {
                state.counter = state.counter.saturating_add(1);
            },
            AppAction::Decrement => {
                state.counter = state.counter.saturating_sub(1);
            },
            AppAction::AddTodo { text } => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::debug!("Ignoring todo with blank text");
                    return;
                }

                let id = Self::fresh_id(state, env);
                state.todos.push(TodoItem::new(id, text));
                tracing::debug!(%id, "Todo added");
            },
            AppAction::ToggleTodo { id } => {
                if let Some(todo) = state.todos.iter_mut().find(|t| t.id == id) {
                    todo.toggle();
                } else {
                    tracing::debug!(%id, "Toggle ignored, no such todo");
                }
            },
            AppAction::RemoveTodo { id } => {
                let before = state.todos.len();
                state.todos.retain(|t| t.id != id);
                if state.todos.len() == before {
                    tracing::debug!(%id, "Remove ignored, no such todo");
                }
            },
            AppAction::SetTheme { theme } => {
                state.theme = theme;
            },
        }
    }
}
