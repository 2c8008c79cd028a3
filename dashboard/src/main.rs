//! Dashboard binary
//!
//! Drives the three views through one shared store and prints every frame a
//! view re-renders.

use dashboard::{
    app_store_with, AppActions, AppEnvironment, AppStore, CounterView, StatusView, Theme,
    TodoId, TodoView,
};
use shared_store_runtime::StoreConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The three mounted views
struct Views {
    counter: Arc<CounterView>,
    todos: Arc<TodoView>,
    status: Arc<StatusView>,
}

impl Views {
    fn new() -> Self {
        Self {
            counter: Arc::new(CounterView::new()),
            todos: Arc::new(TodoView::new()),
            status: Arc::new(StatusView::new()),
        }
    }

    fn renders(&self) -> [usize; 3] {
        [
            self.counter.renders(),
            self.todos.renders(),
            self.status.renders(),
        ]
    }

    /// Prints the frame of every view whose render count moved past `before`
    fn print_changed(&self, before: [usize; 3]) {
        let frames = [
            ("counter", self.counter.frame()),
            ("todos", self.todos.frame()),
            ("status", self.status.frame()),
        ];
        let mut any = false;
        for ((name, frame), (then, now)) in frames.iter().zip(before.iter().zip(self.renders())) {
            if now > *then {
                any = true;
                println!("  [{name}]");
                for line in frame.lines() {
                    println!("    {line}");
                }
            }
        }
        if !any {
            println!("  (no view re-rendered)");
        }
    }
}

/// Runs one step and reports which views it touched
async fn step<F, Fut>(views: &Views, title: &str, run: F)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    println!("\n>>> {title}");
    let before = views.renders();
    run().await;
    views.print_changed(before);
}

async fn run_scenario(store: &AppStore, views: &Views) {
    step(views, "increment", move || store.increment()).await;
    step(views, "increment", move || store.increment()).await;
    step(views, "decrement", move || store.decrement()).await;
    step(views, "add todo \"buy milk\"", move || store.add_todo("buy milk")).await;
    step(views, "add todo \"   \" (blank)", move || store.add_todo("   ")).await;

    let first = store.state(|s| s.todos.first().map(|t| t.id)).await;
    if let Some(id) = first {
        step(views, &format!("toggle todo #{id}"), move || store.toggle_todo(id)).await;
    }

    step(views, "set theme dark", move || store.set_theme(Theme::Dark)).await;
    step(views, "set theme dark again", move || store.set_theme(Theme::Dark)).await;
    step(views, "toggle theme", move || store.toggle_theme()).await;
    step(views, "toggle theme", move || store.toggle_theme()).await;
    step(views, "remove todo #9999 (missing)", move || {
        store.remove_todo(TodoId::new(9999))
    })
    .await;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard=info,shared_store_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::from_env()?;
    tracing::info!(store = %config.label, "Starting dashboard");

    println!("=== Dashboard: one store, three views ===");

    let store = app_store_with(AppEnvironment::sequential(), config);
    let views = Views::new();

    // Mount: each view renders its current slice once
    println!("\n>>> mount views");
    let before = views.renders();
    let handles = [
        store.subscribe_with(Arc::clone(&views.counter)).await,
        store.subscribe_with(Arc::clone(&views.todos)).await,
        store.subscribe_with(Arc::clone(&views.status)).await,
    ];
    views.print_changed(before);

    run_scenario(&store, &views).await;

    let state = store.snapshot().await;
    println!("\nFinal state:\n{}", serde_json::to_string_pretty(&state)?);

    // Unmount
    for handle in handles {
        handle.unsubscribe();
    }
    tracing::info!(
        renders = ?views.renders(),
        remaining = store.subscription_count(),
        "Dashboard finished"
    );

    Ok(())
}
