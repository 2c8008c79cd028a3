//! Integration tests for the dashboard store
//!
//! Exercises the named actions, selector subscriptions and the three views
//! end-to-end through a real `Store`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use dashboard::{
    app_store, app_store_with, AppAction, AppActions, AppEnvironment, AppState, AppStatePatch,
    CounterView, StatusView, Theme, TodoId, TodoItem, TodoView,
};
use proptest::prelude::*;
use shared_store_core::Selection;
use shared_store_runtime::StoreConfig;
use shared_store_testing::{init_test_tracing, properties, ConstantIdGenerator, Recorder};
use std::sync::Arc;

// ============================================================================
// Named actions
// ============================================================================

#[tokio::test]
async fn test_start_state() {
    let store = app_store();
    assert_eq!(store.snapshot().await, AppState::new());
    assert_eq!(store.initial_state(), AppState::new());
}

#[tokio::test]
async fn test_scenario() {
    init_test_tracing();
    let store = app_store();

    store.increment().await;
    store.increment().await;
    store.decrement().await;
    assert_eq!(store.state(|s| s.counter).await, 1);

    store.add_todo("buy milk").await;
    let todos = store.state(|s| s.todos.clone()).await;
    assert_eq!(todos.len(), 1);
    let id = todos[0].id;
    assert_eq!(todos, vec![TodoItem::new(id, "buy milk")]);

    store.toggle_todo(id).await;
    store.set_theme(Theme::Dark).await;

    let mut completed = TodoItem::new(id, "buy milk");
    completed.completed = true;
    assert_eq!(
        store.snapshot().await,
        AppState {
            counter: 1,
            todos: vec![completed],
            theme: Theme::Dark,
        }
    );
}

#[tokio::test]
async fn test_add_todo_appends_trimmed_item() {
    let store = app_store();
    store.add_todo("first").await;
    store.add_todo("  second  ").await;

    let todos = store.state(|s| s.todos.clone()).await;
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[1].text, "second");
    assert!(!todos[1].completed);
}

#[tokio::test]
async fn test_rapid_adds_get_distinct_ids() {
    let store = app_store();
    store.add_todo("a").await;
    store.add_todo("b").await;

    let ids = store
        .state(|s| s.todos.iter().map(|t| t.id).collect::<Vec<_>>())
        .await;
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_ids_stay_unique_with_stuck_generator() {
    let store = app_store_with(
        AppEnvironment::new(Arc::new(ConstantIdGenerator(5))),
        StoreConfig::default(),
    );
    for text in ["a", "b", "c", "d"] {
        store.add_todo(text).await;
    }

    let mut ids = store
        .state(|s| s.todos.iter().map(|t| t.id).collect::<Vec<_>>())
        .await;
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[tokio::test]
async fn test_ids_skip_todos_from_replaced_state() {
    let store = app_store();
    let mut seeded = AppState::new();
    seeded.todos.push(TodoItem::new(TodoId::new(1), "seeded"));
    seeded.todos.push(TodoItem::new(TodoId::new(2), "seeded too"));
    store.replace_state(seeded).await;

    store.add_todo("fresh").await;

    let fresh = store.state(|s| s.todos[2].id).await;
    assert_eq!(fresh, TodoId::new(3));
}

#[tokio::test]
async fn test_toggle_twice_restores() {
    let store = app_store();
    store.add_todo("a").await;
    store.add_todo("b").await;
    let before = store.snapshot().await;
    let id = before.todos[0].id;

    store.toggle_todo(id).await;
    let toggled = store.snapshot().await;
    assert!(toggled.todos[0].completed);
    assert_eq!(toggled.todos[1], before.todos[1]);

    store.toggle_todo(id).await;
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn test_remove_todo() {
    let store = app_store();
    store.add_todo("a").await;
    store.add_todo("b").await;
    let id = store.state(|s| s.todos[0].id).await;

    store.remove_todo(id).await;

    let todos = store.state(|s| s.todos.clone()).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].text, "b");
}

#[tokio::test]
async fn test_missing_id_is_silent_noop() {
    let store = app_store();
    store.add_todo("only").await;
    let before = store.snapshot().await;

    let todos = Recorder::new();
    let _handle = store
        .subscribe(|s: &AppState| s.todos.clone(), todos.callback())
        .await;

    store.toggle_todo(TodoId::new(404)).await;
    store.remove_todo(TodoId::new(404)).await;

    assert_eq!(store.snapshot().await, before);
    assert!(todos.is_empty());
}

#[tokio::test]
async fn test_theme_round_trip_and_toggle() {
    let store = app_store();
    store.set_theme(Theme::Dark).await;
    store.set_theme(Theme::Light).await;
    assert_eq!(store.state(|s| s.theme).await, Theme::Light);

    store.toggle_theme().await;
    assert_eq!(store.state(|s| s.theme).await, Theme::Dark);
}

#[tokio::test]
async fn test_set_state_and_merge() {
    let store = app_store();
    store.add_todo("kept").await;

    store
        .set_state(|s| AppStatePatch::default().with_counter(s.counter + 41))
        .await;
    store
        .merge(AppStatePatch::default().with_theme(Theme::Dark))
        .await;

    let state = store.snapshot().await;
    assert_eq!(state.counter, 41);
    assert_eq!(state.theme, Theme::Dark);
    assert_eq!(state.todo_count(), 1);
}

// ============================================================================
// Subscriptions
// ============================================================================

#[tokio::test]
async fn test_theme_subscriber_ignores_counter() {
    let store = app_store();
    let themes = Recorder::new();
    let _handle = store
        .subscribe(|s: &AppState| s.theme, themes.callback())
        .await;

    store.increment().await;
    store.decrement().await;
    assert!(themes.is_empty());

    store.set_theme(Theme::Dark).await;
    assert_eq!(themes.values(), vec![Theme::Dark]);

    // Same value again is not a change
    store.set_theme(Theme::Dark).await;
    assert_eq!(themes.len(), 1);
}

#[tokio::test]
async fn test_blank_add_notifies_nobody() {
    let store = app_store();
    let todos = Recorder::new();
    let _handle = store
        .subscribe(|s: &AppState| s.todos.len(), todos.callback())
        .await;

    store.add_todo("   ").await;
    store.send(AppAction::AddTodo { text: String::new() }).await;

    assert!(todos.is_empty());
    assert_eq!(store.state(AppState::todo_count).await, 0);
}

#[tokio::test]
async fn test_unsubscribe_stops_callbacks() {
    let store = app_store();
    let counts = Recorder::new();
    let handle = store
        .subscribe(|s: &AppState| s.counter, counts.callback())
        .await;

    store.increment().await;
    assert!(handle.unsubscribe());
    store.increment().await;

    assert_eq!(counts.values(), vec![1]);
    assert_eq!(store.subscription_count(), 0);
}

#[tokio::test]
async fn test_destroy_silences_everything() {
    let store = app_store();
    let counts = Recorder::new();
    let themes = Recorder::new();
    let first = store
        .subscribe(|s: &AppState| s.counter, counts.callback())
        .await;
    let _second = store
        .subscribe(|s: &AppState| s.theme, themes.callback())
        .await;

    assert_eq!(store.destroy(), 2);
    store.increment().await;
    store.set_theme(Theme::Dark).await;

    assert!(counts.is_empty());
    assert!(themes.is_empty());
    assert!(!first.unsubscribe());
}

#[tokio::test]
async fn test_custom_equality_suppresses_notifications() {
    let store = app_store();
    let signs = Recorder::new();
    let _handle = store
        .subscribe_with(
            Selection::new(|s: &AppState| s.counter, signs.callback())
                .with_equality(|a: &i64, b: &i64| a.signum() == b.signum()),
        )
        .await;

    store.increment().await; // 0 -> 1, sign changes
    store.increment().await; // 1 -> 2, same sign
    store.increment().await; // 2 -> 3, same sign

    assert_eq!(signs.values(), vec![1]);
}

#[tokio::test]
async fn test_fire_immediately_delivers_current_slice() {
    let store = app_store();
    store.increment().await;

    let counts = Recorder::new();
    let _handle = store
        .subscribe_with(
            Selection::new(|s: &AppState| s.counter, counts.callback()).fire_immediately(),
        )
        .await;

    assert_eq!(counts.values(), vec![1]);
}

#[tokio::test]
async fn test_notifications_follow_update_order() {
    let store = app_store();
    let counts = Recorder::new();
    let _handle = store
        .subscribe(|s: &AppState| s.counter, counts.callback())
        .await;

    store.increment().await;
    store.increment().await;
    store.decrement().await;

    assert_eq!(counts.values(), vec![1, 2, 1]);
}

// ============================================================================
// Views
// ============================================================================

#[tokio::test]
async fn test_views_render_only_their_slice() {
    let store = app_store();
    let counter = Arc::new(CounterView::new());
    let todos = Arc::new(TodoView::new());
    let status = Arc::new(StatusView::new());

    let _handles = [
        store.subscribe_with(Arc::clone(&counter)).await,
        store.subscribe_with(Arc::clone(&todos)).await,
        store.subscribe_with(Arc::clone(&status)).await,
    ];

    // Mount renders each view once
    assert_eq!((counter.renders(), todos.renders(), status.renders()), (1, 1, 1));
    assert_eq!(counter.frame(), "Count: 0");
    assert_eq!(todos.frame(), "No todos yet. Add one above!");

    store.increment().await;
    assert_eq!((counter.renders(), todos.renders(), status.renders()), (2, 1, 2));

    store.add_todo("buy milk").await;
    assert_eq!((counter.renders(), todos.renders(), status.renders()), (2, 2, 3));
    assert_eq!(todos.frame(), "[ ] #1 buy milk");

    store.set_theme(Theme::Dark).await;
    assert_eq!((counter.renders(), todos.renders(), status.renders()), (2, 2, 4));
    assert_eq!(status.frame(), "Theme: dark | Count: 1 | Todos: 0/1 done");
}

// ============================================================================
// Concurrency and isolation
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_are_not_lost() {
    let store = app_store();
    let mut tasks = Vec::new();

    for i in 0..50 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store.increment().await;
            store.add_todo(format!("task {i}")).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let state = store.snapshot().await;
    assert_eq!(state.counter, 50);
    assert_eq!(state.todo_count(), 50);

    let mut ids: Vec<_> = state.todos.iter().map(|t| t.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[tokio::test]
async fn test_stores_are_isolated() {
    let first = app_store();
    let second = app_store();
    let counts = Recorder::new();
    let _handle = second
        .subscribe(|s: &AppState| s.counter, counts.callback())
        .await;

    first.increment().await;
    first.add_todo("only in first").await;

    assert_eq!(second.snapshot().await, AppState::new());
    assert!(counts.is_empty());
}

#[test]
fn test_store_usable_from_blocking_code() {
    let store = app_store();
    tokio_test::block_on(async {
        store.increment().await;
        store.toggle_theme().await;
    });
    let state = tokio_test::block_on(store.snapshot());
    assert_eq!((state.counter, state.theme), (1, Theme::Dark));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_counter_is_increments_minus_decrements(ops in prop::collection::vec(any::<bool>(), 0..64)) {
        let store = app_store();
        let increments = ops.iter().filter(|&&up| up).count();
        let decrements = ops.len() - increments;

        let counter = tokio_test::block_on(async {
            for up in &ops {
                if *up {
                    store.increment().await;
                } else {
                    store.decrement().await;
                }
            }
            store.state(|s| s.counter).await
        });

        prop_assert_eq!(counter, increments as i64 - decrements as i64);
    }

    #[test]
    fn prop_add_todo_stores_trimmed_text(text in properties::padded_text()) {
        let store = app_store();
        let todos = tokio_test::block_on(async {
            store.add_todo(text.clone()).await;
            store.state(|s| s.todos.clone()).await
        });

        prop_assert_eq!(todos.len(), 1);
        prop_assert_eq!(todos[0].text.as_str(), text.trim());
        prop_assert!(!todos[0].completed);
    }

    #[test]
    fn prop_blank_todo_is_ignored(text in properties::blank_text()) {
        let store = app_store();
        let count = tokio_test::block_on(async {
            store.add_todo(text).await;
            store.state(AppState::todo_count).await
        });

        prop_assert_eq!(count, 0);
    }
}
