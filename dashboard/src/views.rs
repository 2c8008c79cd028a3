//! Text views over the dashboard state.
//!
//! Each view observes one slice of [`AppState`] through [`Subscribable`] and
//! re-renders only when that slice changes. A view keeps its last frame and
//! how often it rendered, so callers (and tests) can see exactly which views
//! an update touched.

use crate::types::{AppState, Theme, TodoItem};
use shared_store_core::subscription::Subscribable;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Text shown by [`TodoView`] for an empty list
pub const EMPTY_TODOS: &str = "No todos yet. Add one above!";

/// Render bookkeeping shared by the views
#[derive(Debug, Default)]
struct Canvas {
    renders: AtomicUsize,
    frame: Mutex<String>,
}

impl Canvas {
    fn draw(&self, frame: String) {
        *self
            .frame
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = frame;
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn frame(&self) -> String {
        self.frame
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

/// Shows the counter value
#[derive(Debug, Default)]
pub struct CounterView {
    canvas: Canvas,
}

impl CounterView {
    /// Creates a view that has not rendered yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders a counter value
    #[must_use]
    pub fn render(counter: i64) -> String {
        format!("Count: {counter}")
    }

    /// The last rendered frame, empty before the first render
    #[must_use]
    pub fn frame(&self) -> String {
        self.canvas.frame()
    }

    /// How many times this view rendered
    #[must_use]
    pub fn renders(&self) -> usize {
        self.canvas.renders()
    }
}

impl Subscribable<AppState> for CounterView {
    type Slice = i64;

    fn select(&self, state: &AppState) -> i64 {
        state.counter
    }

    fn on_change(&self, counter: &i64) {
        tracing::debug!(counter, "CounterView re-render");
        self.canvas.draw(Self::render(*counter));
    }

    fn is_same(&self, previous: &i64, current: &i64) -> bool {
        previous == current
    }

    fn fires_immediately(&self) -> bool {
        true
    }
}

/// Lists the todos, one per line
#[derive(Debug, Default)]
pub struct TodoView {
    canvas: Canvas,
}

impl TodoView {
    /// Creates a view that has not rendered yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders a todo list
    ///
    /// ```
    /// use dashboard::{TodoId, TodoItem, TodoView};
    ///
    /// let todos = vec![TodoItem::new(TodoId::new(1), "buy milk")];
    /// assert_eq!(TodoView::render(&todos), "[ ] #1 buy milk");
    /// ```
    #[must_use]
    pub fn render(todos: &[TodoItem]) -> String {
        if todos.is_empty() {
            return EMPTY_TODOS.to_string();
        }

        let mut out = String::new();
        for (i, todo) in todos.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let mark = if todo.completed { 'x' } else { ' ' };
            let _ = write!(out, "[{mark}] #{} {}", todo.id, todo.text);
        }
        out
    }

    /// The last rendered frame, empty before the first render
    #[must_use]
    pub fn frame(&self) -> String {
        self.canvas.frame()
    }

    /// How many times this view rendered
    #[must_use]
    pub fn renders(&self) -> usize {
        self.canvas.renders()
    }
}

impl Subscribable<AppState> for TodoView {
    type Slice = Vec<TodoItem>;

    fn select(&self, state: &AppState) -> Vec<TodoItem> {
        state.todos.clone()
    }

    fn on_change(&self, todos: &Vec<TodoItem>) {
        tracing::debug!(count = todos.len(), "TodoView re-render");
        self.canvas.draw(Self::render(todos));
    }

    fn is_same(&self, previous: &Vec<TodoItem>, current: &Vec<TodoItem>) -> bool {
        previous == current
    }

    fn fires_immediately(&self) -> bool {
        true
    }
}

/// What [`StatusView`] observes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSlice {
    /// Active theme
    pub theme: Theme,
    /// Counter value
    pub counter: i64,
    /// Number of todos
    pub total: usize,
    /// Number of completed todos
    pub completed: usize,
}

impl StatusSlice {
    /// Projects the status line inputs out of the state
    #[must_use]
    pub fn of(state: &AppState) -> Self {
        Self {
            theme: state.theme,
            counter: state.counter,
            total: state.todo_count(),
            completed: state.completed_count(),
        }
    }
}

/// One-line summary: theme, counter and todo totals
#[derive(Debug, Default)]
pub struct StatusView {
    canvas: Canvas,
}

impl StatusView {
    /// Creates a view that has not rendered yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders a status line
    #[must_use]
    pub fn render(slice: &StatusSlice) -> String {
        format!(
            "Theme: {} | Count: {} | Todos: {}/{} done",
            slice.theme, slice.counter, slice.completed, slice.total
        )
    }

    /// The last rendered frame, empty before the first render
    #[must_use]
    pub fn frame(&self) -> String {
        self.canvas.frame()
    }

    /// How many times this view rendered
    #[must_use]
    pub fn renders(&self) -> usize {
        self.canvas.renders()
    }
}

impl Subscribable<AppState> for StatusView {
    type Slice = StatusSlice;

    fn select(&self, state: &AppState) -> StatusSlice {
        StatusSlice::of(state)
    }

    fn on_change(&self, slice: &StatusSlice) {
        tracing::debug!(theme = %slice.theme, "StatusView re-render");
        self.canvas.draw(Self::render(slice));
    }

    fn is_same(&self, previous: &StatusSlice, current: &StatusSlice) -> bool {
        previous == current
    }

    fn fires_immediately(&self) -> bool {
        true
    }
}
