
use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};

use tembiapo_sync::error::FormError;
use tembiapo_sync::form::DeleteOutcome;
use tembiapo_sync::notify::ScriptedConfirmation;
use tembiapo_sync::view::{shift_month, Period, ViewProjection};
use tembiapo_sync::{Event, EventDraft, EventEdit};

use scenarii::{event_fields, Fixture};


fn asuncion() -> ViewProjection {
    ViewProjection::new(FixedOffset::west_opt(3 * 3600).unwrap(), 5)
}

#[tokio::test]
async fn a_month_of_events() {
    let fixture = Fixture::new("ana");
    let created = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
    let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2026, 10, d, h, 0, 0).unwrap();
    fixture.seed::<Event>("e1", event_fields("Parcial", at(20, 12), created));
    fixture.seed::<Event>("e2", event_fields("Entrega", at(5, 12), created));
    fixture.seed::<Event>("e3", event_fields("Laboratorio", at(20, 18), created));
    fixture.seed::<Event>("e4", event_fields("Otro mes", Utc.with_ymd_and_hms(2026, 11, 20, 12, 0, 0).unwrap(), created));

    let mut sync = fixture.sync::<Event>();
    sync.start(Some(fixture.owner.clone()));
    sync.process_pending();

    let view = asuncion();
    let october = view.in_period(sync.records(), Period::Month { year: 2026, month: 10 });
    assert_eq!(october.len(), 3);
    let on_20th: Vec<String> = view.on_day(&october, 20).iter().map(|e| e.title().to_string()).collect();
    assert_eq!(on_20th, vec!["Parcial", "Laboratorio"]);

    let markers = view.month_markers(sync.records(), 2026, 10);
    assert_eq!(markers.get(&20), Some(&2));
    assert_eq!(markers.get(&5), Some(&1));
    assert_eq!(markers.len(), 2);

    let (year, month) = shift_month(2026, 10, 1);
    assert_eq!(view.in_period(sync.records(), Period::Month { year, month }).len(), 1);

    let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let upcoming: Vec<String> = view.upcoming(sync.records(), today).iter().map(|e| e.title().to_string()).collect();
    assert_eq!(upcoming, vec!["Parcial", "Laboratorio", "Otro mes"]);

    // Projections have no hidden state
    assert_eq!(view.in_period(sync.records(), Period::Month { year: 2026, month: 10 }), october);
}

#[tokio::test]
async fn plan_then_cancel_an_exam() {
    let fixture = Fixture::new("ana");
    let mut sync = fixture.sync::<Event>();
    sync.start(Some(fixture.owner.clone()));
    sync.process_pending();

    let mut form = fixture.form::<EventDraft>();
    form.open_for_create();
    form.set_field(EventEdit::Title("Parcial de álgebra".to_string()));
    // No date picked yet
    assert!(matches!(form.submit().await, Err(FormError::Validation(_))));
    assert!(form.field_problems().contains_key("date"));

    let exam_day = Utc::now() + Duration::days(2);
    form.set_field(EventEdit::Date(Some(exam_day)));
    form.set_field(EventEdit::Time("930".to_string()));
    assert!(form.field_problems().is_empty());
    assert_eq!(form.draft().time, "93:0");
    form.set_field(EventEdit::Time("0930".to_string()));
    form.submit().await.unwrap();

    sync.process_pending();
    let event = sync.records()[0].clone();
    assert_eq!(event.title(), "Parcial de álgebra");
    assert_eq!(event.time(), "09:30");
    assert_eq!(event.date(), &exam_day);

    let view = ViewProjection::new(FixedOffset::east_opt(0).unwrap(), 5);
    assert_eq!(view.upcoming(sync.records(), view.today()).len(), 1);

    form.open_for_edit(&event);
    let outcome = form.delete(event.id(), &ScriptedConfirmation::accepting()).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(!form.is_visible());

    sync.process_pending();
    assert!(sync.records().is_empty());
}
