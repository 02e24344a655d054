//! To-do tasks (the "notes" list)

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::document::{CollectionPath, Document, DocumentId, FieldValue, Fields, OwnerId};
use crate::error::{FieldIssue, Problem, ValidationError};
use crate::form::Draft;
use crate::mask;
use crate::record::{self, Category, Deletable, DeleteMessages, Priority, Record, RecordMessages};

pub(crate) const TITLE: &str = "titulo";
pub(crate) const DESCRIPTION: &str = "descripcion";
pub(crate) const CATEGORY: &str = "categoria";
pub(crate) const PRIORITY: &str = "prioridad";
pub(crate) const COMPLETED: &str = "completado";
pub(crate) const CREATED: &str = "creado";
pub(crate) const DUE: &str = "fechaVencimiento";

static MESSAGES: RecordMessages = RecordMessages {
    invalid: "El título no puede estar vacío",
    load_failed: "No se pudieron cargar las notas",
    created: "Tu nota se agregó correctamente",
    updated: "Tarea actualizada correctamente",
    save_failed: "No se pudo guardar la nota",
};

static DELETE_MESSAGES: DeleteMessages = DeleteMessages {
    title: "Eliminar nota",
    question: "¿Estás seguro de que quieres eliminar esta nota?",
    deleted: "Nota eliminada correctamente",
    failed: "No se pudo eliminar la nota",
};


/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned by the store
    id: DocumentId,
    title: String,
    description: String,
    category: Category,
    priority: Priority,
    completed: bool,
    /// Assigned by the store when the task is created.
    created_at: DateTime<Utc>,
    /// An optional deadline
    due_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a Task instance, e.g. one that has been read from the store
    pub fn new_with_parameters(id: DocumentId, title: String, description: String,
                               category: Category, priority: Priority, completed: bool,
                               created_at: DateTime<Utc>, due_at: Option<DateTime<Utc>>,
                            ) -> Self
    {
        Self { id, title, description, category, priority, completed, created_at, due_at }
    }

    pub fn id(&self) -> &DocumentId        { &self.id          }
    pub fn title(&self) -> &str            { &self.title       }
    pub fn description(&self) -> &str      { &self.description }
    pub fn category(&self) -> Category     { self.category     }
    pub fn priority(&self) -> Priority     { self.priority     }
    pub fn completed(&self) -> bool        { self.completed    }
    pub fn created_at(&self) -> &DateTime<Utc>      { &self.created_at }
    pub fn due_at(&self) -> Option<&DateTime<Utc>>  { self.due_at.as_ref() }

    /// The partial update that flips the completion flag
    pub fn toggle_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(COMPLETED.to_string(), FieldValue::Bool(!self.completed));
        fields
    }
}

impl Record for Task {
    fn collection(owner: &OwnerId) -> CollectionPath {
        CollectionPath::owner_scoped("todos", owner, "user_todos")
    }

    fn decode(doc: &Document, now: DateTime<Utc>) -> Self {
        Self {
            id: doc.id().clone(),
            title: record::decode_title(doc, TITLE),
            description: record::decode_text(doc, DESCRIPTION),
            category: Category::from_wire(doc.str(CATEGORY)),
            priority: Priority::from_wire(doc.str(PRIORITY)),
            completed: doc.bool(COMPLETED).unwrap_or(false),
            created_at: record::decode_date(doc, CREATED, now),
            due_at: record::decode_optional_date(doc, DUE, now),
        }
    }

    fn id(&self) -> &DocumentId { &self.id }
    fn title(&self) -> &str { &self.title }
    fn date(&self) -> Option<DateTime<Utc>> { self.due_at }
    fn is_completed(&self) -> bool { self.completed }

    fn messages() -> &'static RecordMessages {
        &MESSAGES
    }
}

impl Deletable for Task {
    fn delete_messages() -> &'static DeleteMessages {
        &DELETE_MESSAGES
    }
}


/// A single edit of a task form
#[derive(Clone, Debug, PartialEq)]
pub enum TaskEdit {
    Title(String),
    Description(String),
    Category(Category),
    Priority(Priority),
    DueDate(Option<DateTime<Utc>>),
}

/// The editable part of a task
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub due_at: Option<DateTime<Utc>>,
}

impl TaskDraft {
    fn editable_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(TITLE.to_string(), self.title.trim().into());
        fields.insert(DESCRIPTION.to_string(), self.description.trim().into());
        fields.insert(CATEGORY.to_string(), self.category.wire_name().into());
        fields.insert(PRIORITY.to_string(), self.priority.wire_name().into());
        fields
    }
}

impl Draft for TaskDraft {
    type Record = Task;
    type Edit = TaskEdit;

    fn from_record(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            category: task.category,
            priority: task.priority,
            due_at: task.due_at,
        }
    }

    fn apply(&mut self, edit: TaskEdit, settings: &Settings) {
        match edit {
            TaskEdit::Title(t) => self.title = mask::truncate_chars(&t, settings.title_max_chars),
            TaskEdit::Description(d) => self.description = mask::truncate_chars(&d, settings.description_max_chars),
            TaskEdit::Category(c) => self.category = c,
            TaskEdit::Priority(p) => self.priority = p,
            TaskEdit::DueDate(d) => self.due_at = d,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.title.trim().is_empty() {
            issues.push(FieldIssue::new(TITLE, Problem::Required));
        }
        ValidationError::check(issues)
    }

    fn create_fields(&self) -> Option<Fields> {
        let mut fields = self.editable_fields();
        fields.insert(COMPLETED.to_string(), FieldValue::Bool(false));
        fields.insert(CREATED.to_string(), FieldValue::ServerTimestamp);
        if let Some(due) = self.due_at {
            fields.insert(DUE.to_string(), FieldValue::Timestamp(due));
        }
        Some(fields)
    }

    fn update_fields(&self) -> Fields {
        let mut fields = self.editable_fields();
        let due = match self.due_at {
            Some(due) => FieldValue::Timestamp(due),
            None => FieldValue::Null,
        };
        fields.insert(DUE.to_string(), due);
        fields
    }
}
