//! What tasks, events and profiles have in common
//!
//! Documents coming from the store are loosely typed: any field may be missing, or hold a value of an unexpected type.
//! Each record kind decodes them in a single place, substituting defaults rather than failing.

use std::fmt::Debug;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{CollectionPath, Document, DocumentId, FieldValue, OwnerId};

/// The title given to documents that have none
pub const DEFAULT_TITLE: &str = "Sin título";


/// A typed item mirrored from an owner-scoped remote collection
pub trait Record: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Where the records of this owner live
    fn collection(owner: &OwnerId) -> CollectionPath;

    /// Build a record from a raw document.
    ///
    /// This never fails: missing or malformed fields are replaced by defaults. `now` is used for unreadable dates.
    fn decode(doc: &Document, now: DateTime<Utc>) -> Self;

    fn id(&self) -> &DocumentId;
    fn title(&self) -> &str;

    /// The date views use to place this record in time, if any
    fn date(&self) -> Option<DateTime<Utc>>;

    fn is_completed(&self) -> bool {
        false
    }

    /// Whether a document of `collection(owner)` is one of `owner`'s records.
    ///
    /// Collections scoped by their path hold nothing else. Shared collections have to tell them apart by id
    fn belongs_to(_id: &DocumentId, _owner: &OwnerId) -> bool {
        true
    }

    /// User-facing texts about this kind of record
    fn messages() -> &'static RecordMessages;
}


/// The texts shown to the user around a record kind
#[derive(Debug)]
pub struct RecordMessages {
    pub invalid: &'static str,
    pub load_failed: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub save_failed: &'static str,
}


/// Records the user may delete
pub trait Deletable: Record {
    fn delete_messages() -> &'static DeleteMessages;
}

/// The texts of the delete confirmation and of its outcome
#[derive(Debug)]
pub struct DeleteMessages {
    pub title: &'static str,
    pub question: &'static str,
    pub deleted: &'static str,
    pub failed: &'static str,
}


/// What a task is about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Personal,
    Work,
    Study,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Personal, Category::Work, Category::Study, Category::Other];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Work => "trabajo",
            Category::Study => "estudio",
            Category::Other => "otro",
        }
    }

    /// Unknown values fall back to the default category
    pub fn from_wire(value: Option<&str>) -> Self {
        Self::ALL.iter()
            .copied()
            .find(|c| Some(c.wire_name()) == value)
            .unwrap_or_default()
    }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Priority::Low => "baja",
            Priority::Medium => "media",
            Priority::High => "alta",
        }
    }

    /// Unknown values fall back to the default priority
    pub fn from_wire(value: Option<&str>) -> Self {
        Self::ALL.iter()
            .copied()
            .find(|p| Some(p.wire_name()) == value)
            .unwrap_or_default()
    }
}


/// Read a title, defaulting to [`DEFAULT_TITLE`] when it is missing or empty
pub fn decode_title(doc: &Document, field: &str) -> String {
    match doc.str(field) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}

/// Read a string field, defaulting to an empty string
pub fn decode_text(doc: &Document, field: &str) -> String {
    doc.str(field).unwrap_or_default().to_string()
}

/// Read a date that may come as a native timestamp or as an epoch-seconds object.
///
/// Returns `None` when the field is missing or null, and `Some(now)` (with a warning) when it cannot be understood.
pub fn decode_optional_date(doc: &Document, field: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match doc.get(field) {
        None | Some(FieldValue::Null) => None,
        Some(value) => Some(normalize_date(value).unwrap_or_else(|| {
            log::warn!("Invalid date in {}.{} ({:?}), using the current time", doc.id(), field, value);
            now
        })),
    }
}

/// Read a date that is expected to be present. Missing or unreadable dates become `now`
pub fn decode_date(doc: &Document, field: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    decode_optional_date(doc, field, now).unwrap_or_else(|| {
        log::warn!("Missing date in {}.{}, using the current time", doc.id(), field);
        now
    })
}

fn normalize_date(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Timestamp(t) => Some(*t),
        FieldValue::Map(map) => {
            let seconds = match map.get("seconds") {
                Some(FieldValue::Integer(s)) => *s,
                Some(FieldValue::Double(s)) if s.is_finite() => s.trunc() as i64,
                _ => return None,
            };
            if seconds == 0 {
                return None;
            }
            let nanos = match map.get("nanoseconds") {
                Some(FieldValue::Integer(n)) if (0..1_000_000_000).contains(n) => *n as u32,
                _ => 0,
            };
            Utc.timestamp_opt(seconds, nanos).single()
        },
        // ServerTimestamp is a pending local write: the server has not assigned the time yet
        _ => None,
    }
}
