//! A walk through the sync core, against an in-memory store.
//!
//! Usage: `tembiapo-demo [settings.json]`. Set `RUST_LOG` to see more (or less) about what happens.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};

use tembiapo_sync::config::Settings;
use tembiapo_sync::document::OwnerId;
use tembiapo_sync::auth::SessionAuth;
use tembiapo_sync::notify::{LogNotifier, ScriptedConfirmation};
use tembiapo_sync::traits::{AuthProvider, Notifier};
use tembiapo_sync::view::Period;
use tembiapo_sync::{CollectionSync, Event, EventDraft, EventEdit, FormState, MemoryStore, RecordActions, Task, TaskEdit, TaskDraft, ViewProjection};


#[tokio::main]
async fn main() {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_or_default(Path::new(&path)),
        None => Settings::default(),
    };
    tembiapo_sync::logging::init(&settings);

    println!("This demo shows a task list and a calendar following an in-memory store.");
    println!("");

    if let Err(err) = run(settings).await {
        log::error!("Demo failed: {}", err);
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> Result<(), Box<dyn Error>> {
    let store = Arc::new(MemoryStore::new());
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let auth = SessionAuth::signed_in(OwnerId::new("demo-user"));
    let owner = auth.current_owner();

    let mut tasks: CollectionSync<Task, _> = CollectionSync::new(Arc::clone(&store), Arc::clone(&notifier));
    let mut events: CollectionSync<Event, _> = CollectionSync::new(Arc::clone(&store), Arc::clone(&notifier));
    tasks.start(owner.clone());
    events.start(owner.clone());

    let mut task_form: FormState<TaskDraft, _> = FormState::new(Arc::clone(&store), Arc::clone(&notifier), settings.clone());
    task_form.set_owner(owner.clone());
    for title in &["Comprar leche", "Leer capítulo 4", "Preparar la exposición"] {
        task_form.open_for_create();
        task_form.set_field(TaskEdit::Title(title.to_string()));
        task_form.submit().await?;
    }

    let mut event_form: FormState<EventDraft, _> = FormState::new(Arc::clone(&store), Arc::clone(&notifier), settings.clone());
    event_form.set_owner(owner.clone());
    for (title, in_days, time) in &[("Parcial de cálculo", 3, "0800"), ("Entrega de TP", 10, "2359"), ("Laboratorio", -2, "")] {
        event_form.open_with(EventDraft::on(Utc::now() + Duration::days(*in_days)));
        event_form.set_field(EventEdit::Title(title.to_string()));
        event_form.set_field(EventEdit::Time(time.to_string()));
        event_form.submit().await?;
    }

    tasks.process_pending();
    events.process_pending();

    let mut actions = RecordActions::new(Arc::clone(&store), Arc::clone(&notifier));
    actions.set_owner(owner);
    if let Some(first) = tasks.records().first().cloned() {
        actions.toggle_completed(&first).await?;
    }
    if let Some(last) = tasks.records().last().cloned() {
        actions.delete::<Task>(last.id(), &ScriptedConfirmation::accepting()).await?;
    }
    tasks.process_pending();

    let view = ViewProjection::local(&settings);
    print_views(&view, &tasks, &events);

    tasks.stop();
    events.stop();
    Ok(())
}

fn print_views(view: &ViewProjection, tasks: &CollectionSync<Task, MemoryStore>, events: &CollectionSync<Event, MemoryStore>) {
    let counts = view.counts(tasks.records());
    println!("---- Tasks ({} total, {} completed, {} pending) -----", counts.total, counts.completed, counts.pending);
    for task in view.in_period(tasks.records(), Period::All) {
        let completion = if task.completed() { "✓" } else { " " };
        println!("  {} {}\t{}", completion, task.title(), task.category().wire_name());
    }

    println!("---- Upcoming events -----");
    for event in view.upcoming(events.records(), view.today()) {
        println!("  {}\t{}\t{}", view.day_of(event.date()), event.time(), event.title());
    }
}
