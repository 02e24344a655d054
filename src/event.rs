//! Calendar events (exams, assignments, ...)

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::document::{CollectionPath, Document, DocumentId, FieldValue, Fields, OwnerId};
use crate::error::{FieldIssue, Problem, ValidationError};
use crate::form::Draft;
use crate::mask;
use crate::record::{self, Deletable, DeleteMessages, Priority, Record, RecordMessages};

pub(crate) const TITLE: &str = "titulo";
pub(crate) const DESCRIPTION: &str = "description";
pub(crate) const DATE: &str = "date";
pub(crate) const KIND: &str = "type";
pub(crate) const TIME: &str = "time";
pub(crate) const PRIORITY: &str = "prioridad";
pub(crate) const CREATED: &str = "createdAt";
pub(crate) const UPDATED: &str = "updatedAt";

static MESSAGES: RecordMessages = RecordMessages {
    invalid: "Por favor ingresa un título y una fecha para el evento",
    load_failed: "No se pudieron cargar los eventos",
    created: "Tu evento se ha guardado correctamente",
    updated: "Tu evento se ha actualizado correctamente",
    save_failed: "No se pudo guardar el evento",
};

static DELETE_MESSAGES: DeleteMessages = DeleteMessages {
    title: "Eliminar evento",
    question: "¿Estás seguro de que quieres eliminar este evento?",
    deleted: "Evento eliminado correctamente",
    failed: "No se pudo eliminar el evento",
};


/// What kind of academic event this is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    Exam,
    Assignment,
    Presentation,
    Lab,
    Other,
}

impl Default for EventKind {
    fn default() -> Self {
        EventKind::Other
    }
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [EventKind::Exam, EventKind::Assignment, EventKind::Presentation, EventKind::Lab, EventKind::Other];

    pub fn wire_name(&self) -> &'static str {
        match self {
            EventKind::Exam => "exam",
            EventKind::Assignment => "assignment",
            EventKind::Presentation => "presentation",
            EventKind::Lab => "lab",
            EventKind::Other => "other",
        }
    }

    pub fn from_wire(value: Option<&str>) -> Self {
        Self::ALL.iter()
            .copied()
            .find(|k| Some(k.wire_name()) == value)
            .unwrap_or_default()
    }
}


/// A calendar event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: DocumentId,
    title: String,
    description: String,
    kind: EventKind,
    priority: Priority,
    date: DateTime<Utc>,
    /// Free `HH:MM` time of day, or an empty string
    time: String,
    created_at: DateTime<Utc>,
}

impl Event {
    pub fn new_with_parameters(id: DocumentId, title: String, description: String,
                               kind: EventKind, priority: Priority,
                               date: DateTime<Utc>, time: String, created_at: DateTime<Utc>,
                            ) -> Self
    {
        Self { id, title, description, kind, priority, date, time, created_at }
    }

    pub fn id(&self) -> &DocumentId        { &self.id          }
    pub fn title(&self) -> &str            { &self.title       }
    pub fn description(&self) -> &str      { &self.description }
    pub fn kind(&self) -> EventKind        { self.kind         }
    pub fn priority(&self) -> Priority     { self.priority     }
    pub fn date(&self) -> &DateTime<Utc>   { &self.date        }
    pub fn time(&self) -> &str             { &self.time        }
    pub fn created_at(&self) -> &DateTime<Utc> { &self.created_at }
}

impl Record for Event {
    fn collection(owner: &OwnerId) -> CollectionPath {
        CollectionPath::owner_scoped("events", owner, "user_events")
    }

    fn decode(doc: &Document, now: DateTime<Utc>) -> Self {
        Self {
            id: doc.id().clone(),
            title: record::decode_title(doc, TITLE),
            description: record::decode_text(doc, DESCRIPTION),
            kind: EventKind::from_wire(doc.str(KIND)),
            priority: Priority::from_wire(doc.str(PRIORITY)),
            date: record::decode_date(doc, DATE, now),
            time: record::decode_text(doc, TIME),
            created_at: record::decode_date(doc, CREATED, now),
        }
    }

    fn id(&self) -> &DocumentId { &self.id }
    fn title(&self) -> &str { &self.title }
    fn date(&self) -> Option<DateTime<Utc>> { Some(self.date) }

    fn messages() -> &'static RecordMessages {
        &MESSAGES
    }
}

impl Deletable for Event {
    fn delete_messages() -> &'static DeleteMessages {
        &DELETE_MESSAGES
    }
}


/// A single edit of an event form
#[derive(Clone, Debug, PartialEq)]
pub enum EventEdit {
    Title(String),
    Description(String),
    Kind(EventKind),
    Priority(Priority),
    Date(Option<DateTime<Utc>>),
    /// Raw keystrokes. They are masked into `HH:MM`
    Time(String),
}

/// The editable part of an event
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub kind: EventKind,
    pub priority: Priority,
    pub date: Option<DateTime<Utc>>,
    pub time: String,
}

impl EventDraft {
    /// A blank draft for a day that has been picked in the calendar
    pub fn on(date: DateTime<Utc>) -> Self {
        Self { date: Some(date), ..Self::default() }
    }

    fn write_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(TITLE.to_string(), self.title.trim().into());
        fields.insert(DESCRIPTION.to_string(), self.description.trim().into());
        fields.insert(KIND.to_string(), self.kind.wire_name().into());
        fields.insert(PRIORITY.to_string(), self.priority.wire_name().into());
        fields.insert(TIME.to_string(), self.time.trim().into());
        if let Some(date) = self.date {
            fields.insert(DATE.to_string(), FieldValue::Timestamp(date));
        }
        fields.insert(UPDATED.to_string(), FieldValue::ServerTimestamp);
        fields
    }
}

impl Draft for EventDraft {
    type Record = Event;
    type Edit = EventEdit;

    fn from_record(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            kind: event.kind,
            priority: event.priority,
            date: Some(event.date),
            time: event.time.clone(),
        }
    }

    fn apply(&mut self, edit: EventEdit, settings: &Settings) {
        match edit {
            EventEdit::Title(t) => self.title = mask::truncate_chars(&t, settings.title_max_chars),
            EventEdit::Description(d) => self.description = mask::truncate_chars(&d, settings.description_max_chars),
            EventEdit::Kind(k) => self.kind = k,
            EventEdit::Priority(p) => self.priority = p,
            EventEdit::Date(d) => self.date = d,
            EventEdit::Time(t) => self.time = mask::time_of_day(&t),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.title.trim().is_empty() {
            issues.push(FieldIssue::new(TITLE, Problem::Required));
        }
        if self.date.is_none() {
            issues.push(FieldIssue::new(DATE, Problem::Required));
        }
        let time = self.time.trim();
        if !time.is_empty() && !mask::is_time_of_day(time) {
            issues.push(FieldIssue::new(TIME, Problem::Malformed));
        }
        ValidationError::check(issues)
    }

    fn create_fields(&self) -> Option<Fields> {
        let mut fields = self.write_fields();
        fields.insert(CREATED.to_string(), FieldValue::ServerTimestamp);
        Some(fields)
    }

    fn update_fields(&self) -> Fields {
        self.write_fields()
    }
}
