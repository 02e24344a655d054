
use chrono::{TimeZone, Utc};

use tembiapo_sync::document::{DocumentId, FieldValue, Fields, OwnerId};
use tembiapo_sync::mock_behaviour::MockBehaviour;
use tembiapo_sync::notify::ScriptedConfirmation;
use tembiapo_sync::record::{Category, Priority, Record, DEFAULT_TITLE};
use tembiapo_sync::store::StoreCall;
use tembiapo_sync::sync::sync_progress::SyncState;
use tembiapo_sync::traits::NoticeKind;
use tembiapo_sync::view::ViewProjection;
use tembiapo_sync::{Profile, Task, TaskDraft, TaskEdit};

use scenarii::{task_fields, Fixture};


#[test]
fn same_snapshot_same_list() {
    let fixture = Fixture::new("ana");
    let created = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
    fixture.seed::<Task>("a", task_fields("Leer", false, created));
    fixture.seed::<Task>("b", task_fields("Escribir", true, created));

    let mut sync = fixture.sync::<Task>();
    sync.start(Some(fixture.owner.clone()));
    assert_eq!(sync.process_pending(), 1);
    let first = sync.records().to_vec();
    assert_eq!(first.len(), 2);

    // Writing the same content again makes the store send an identical snapshot
    fixture.seed::<Task>("b", task_fields("Escribir", true, created));
    assert_eq!(sync.process_pending(), 1);
    assert_eq!(sync.records(), first.as_slice());
}

#[test]
fn missing_fields_get_defaults() {
    let fixture = Fixture::new("ana");
    fixture.seed::<Task>("bare", Fields::new());

    let mut sync = fixture.sync::<Task>();
    let before = Utc::now();
    sync.start(Some(fixture.owner.clone()));
    sync.process_pending();
    let after = Utc::now();

    let task = &sync.records()[0];
    assert_eq!(task.title(), DEFAULT_TITLE);
    assert_eq!(task.description(), "");
    assert_eq!(task.category(), Category::Other);
    assert_eq!(task.priority(), Priority::Medium);
    assert!(!task.completed());
    assert!(task.created_at() >= &before && task.created_at() <= &after);
    assert_eq!(sync.state(), &SyncState::Synced);
}

#[test]
fn switching_owners_never_mixes_lists() {
    let fixture = Fixture::new("ana");
    let created = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
    let ana = OwnerId::new("ana");
    let beto = OwnerId::new("beto");

    let mut sync = fixture.sync::<Task>();
    sync.start(Some(ana.clone()));
    // No snapshot from ana has been applied yet
    sync.start(Some(beto.clone()));

    fixture.store.seed(&Task::collection(&ana), DocumentId::new("ana-1"), task_fields("De Ana", false, created));
    fixture.store.seed(&Task::collection(&beto), DocumentId::new("beto-1"), task_fields("De Beto", false, created));
    sync.process_pending();

    let ids: Vec<&str> = sync.records().iter().map(|t| t.id().as_str()).collect();
    assert_eq!(ids, vec!["beto-1"]);
    assert_eq!(sync.owner(), Some(&beto));
    assert_eq!(fixture.store.listener_count(&Task::collection(&ana)), 0);
}

fn profile_fields(username: &str, first_name: &str, last_name: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("username".to_string(), username.into());
    fields.insert("nombre".to_string(), first_name.into());
    fields.insert("apellido".to_string(), last_name.into());
    fields
}

#[test]
fn profiles_stay_private() {
    let fixture = Fixture::new("ana");
    let beto = OwnerId::new("beto");
    fixture.seed::<Profile>("ana", profile_fields("ana", "Ana", "Ruiz"));
    fixture.store.seed(&Profile::collection(&beto), DocumentId::from(&beto), profile_fields("beto", "Beto", "Gómez"));

    let mut sync = fixture.sync::<Profile>();
    sync.start(Some(fixture.owner.clone()));
    sync.process_pending();
    let ids: Vec<&str> = sync.records().iter().map(|p| p.id().as_str()).collect();
    assert_eq!(ids, vec!["ana"]);
    assert_eq!(sync.records()[0].display_name(), "Ana Ruiz");

    // A change to someone else's profile does not leak in either
    fixture.store.seed(&Profile::collection(&beto), DocumentId::from(&beto), profile_fields("beto2", "Beto", "Gómez"));
    sync.process_pending();
    let ids: Vec<&str> = sync.records().iter().map(|p| p.id().as_str()).collect();
    assert_eq!(ids, vec!["ana"]);
    assert_eq!(fixture.store.documents(&Profile::collection(&beto)).len(), 2);
}

#[test]
fn nothing_reaches_a_stopped_list() {
    let fixture = Fixture::new("ana");
    let created = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
    fixture.seed::<Task>("a", task_fields("Leer", false, created));

    let mut sync = fixture.sync::<Task>();
    sync.start(Some(fixture.owner.clone()));
    sync.process_pending();
    sync.stop();

    fixture.seed::<Task>("b", task_fields("Tarde", false, created));
    assert_eq!(sync.process_pending(), 0);
    assert_eq!(sync.records().len(), 1);
    assert_eq!(sync.state(), &SyncState::Idle);
}

#[test]
fn signed_out_means_empty() {
    let fixture = Fixture::new("ana");
    let mut sync = fixture.sync::<Task>();
    let list = sync.subscribe();

    sync.start(None);
    assert!(sync.records().is_empty());
    assert!(!sync.is_loading());
    assert!(!sync.is_subscribed());
    assert!(fixture.store.calls().is_empty());
    assert!(fixture.notifier.notices().is_empty());
    assert!(list.borrow().owner.is_none());
}

#[tokio::test]
async fn create_a_task() {
    let fixture = Fixture::new("ana");
    let mut sync = fixture.sync::<Task>();
    sync.start(Some(fixture.owner.clone()));
    sync.process_pending();
    let view = ViewProjection::new(chrono::FixedOffset::east_opt(0).unwrap(), 5);
    let total_before = view.counts(sync.records()).total;

    let mut form = fixture.form::<TaskDraft>();
    form.open_for_create();
    form.set_field(TaskEdit::Title("Buy milk".to_string()));
    form.submit().await.unwrap();

    let adds: Vec<Fields> = fixture.store.calls().into_iter()
        .filter_map(|call| match call {
            StoreCall::Add(_, fields) => Some(fields),
            _ => None,
        })
        .collect();
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].get("titulo"), Some(&FieldValue::String("Buy milk".to_string())));
    assert_eq!(adds[0].get("descripcion"), Some(&FieldValue::String(String::new())));
    assert_eq!(adds[0].get("completado"), Some(&FieldValue::Bool(false)));
    assert_eq!(adds[0].get("creado"), Some(&FieldValue::ServerTimestamp));

    // The list only changes when the snapshot comes back
    assert_eq!(view.counts(sync.records()).total, total_before);
    sync.process_pending();
    assert_eq!(view.counts(sync.records()).total, total_before + 1);
    let task = &sync.records()[0];
    assert_eq!(task.title(), "Buy milk");
    assert!(!task.id().as_str().is_empty());

    let notice = fixture.notifier.last().unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
}

#[tokio::test]
async fn cancelled_delete_changes_nothing() {
    let fixture = Fixture::new("ana");
    let created = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
    fixture.seed::<Task>("a", task_fields("Leer", false, created));
    let mut sync = fixture.sync::<Task>();
    sync.start(Some(fixture.owner.clone()));
    sync.process_pending();
    let before = sync.records().to_vec();

    let confirmation = ScriptedConfirmation::refusing();
    fixture.actions().delete::<Task>(&DocumentId::new("a"), &confirmation).await.unwrap();

    assert_eq!(confirmation.prompts().len(), 1);
    assert!(fixture.store.calls().iter().all(|call| !matches!(call, StoreCall::Delete(_))));
    assert_eq!(sync.process_pending(), 0);
    assert_eq!(sync.records(), before.as_slice());
}

#[tokio::test]
async fn toggles_keep_counts_consistent() {
    let fixture = Fixture::new("ana");
    let created = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
    for id in &["a", "b", "c"] {
        fixture.seed::<Task>(id, task_fields(id, false, created));
    }
    let mut sync = fixture.sync::<Task>();
    sync.start(Some(fixture.owner.clone()));
    sync.process_pending();
    let view = ViewProjection::new(chrono::FixedOffset::east_opt(0).unwrap(), 5);
    let actions = fixture.actions();

    for expected_completed in 1..=3 {
        let next = sync.records().iter().find(|t| !t.completed()).cloned().unwrap();
        actions.toggle_completed(&next).await.unwrap();
        sync.process_pending();

        let counts = view.counts(sync.records());
        assert_eq!(counts.completed, expected_completed);
        assert_eq!(counts.pending, counts.total - counts.completed);
    }
}

#[test]
fn revoked_subscription_keeps_the_list() {
    let fixture = Fixture::new("ana");
    let created = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
    fixture.seed::<Task>("a", task_fields("Leer", false, created));

    let mut sync = fixture.sync::<Task>();
    sync.start(Some(fixture.owner.clone()));
    sync.process_pending();

    fixture.store.revoke(&fixture.collection::<Task>(), "permission denied");
    sync.process_pending();
    assert!(matches!(sync.state(), SyncState::Error(_)));
    assert!(!sync.is_loading());
    assert!(!sync.initial_load_failed());
    assert_eq!(sync.records().len(), 1);
    let notice = fixture.notifier.last().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, Task::messages().load_failed);

    // Starting again is the way to retry
    sync.start(Some(fixture.owner.clone()));
    assert_eq!(sync.records().len(), 1);
    sync.process_pending();
    assert_eq!(sync.state(), &SyncState::Synced);
}

#[test]
fn failed_initial_load() {
    let fixture = Fixture::new("ana");
    fixture.store.set_behaviour(MockBehaviour::fail_now(1));

    let mut sync = fixture.sync::<Task>();
    let list = sync.subscribe();
    sync.start(Some(fixture.owner.clone()));

    assert!(sync.initial_load_failed());
    assert!(list.borrow().initial_load_failed);
    assert!(!list.borrow().is_loading());
    assert!(sync.records().is_empty());
}
