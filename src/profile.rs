//! The profile of the signed-in user
//!
//! Profiles live in a flat collection, keyed by the owner id. They are created when the account is registered,
//! so the profile form can only edit them.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::document::{CollectionPath, Document, DocumentId, Fields, OwnerId};
use crate::error::{FieldIssue, Problem, ValidationError};
use crate::form::Draft;
use crate::mask;
use crate::record::{self, Record, RecordMessages};

pub(crate) const EMAIL: &str = "email";
pub(crate) const USERNAME: &str = "username";
pub(crate) const FIRST_NAME: &str = "nombre";
pub(crate) const LAST_NAME: &str = "apellido";
pub(crate) const PHONE: &str = "telefono";
pub(crate) const BIRTH_DATE: &str = "fechaNacimiento";

const NAME_MIN_CHARS: usize = 2;
const USERNAME_MIN_CHARS: usize = 3;
const GUEST: &str = "Guest";

static MESSAGES: RecordMessages = RecordMessages {
    invalid: "Por favor corrige los errores en el formulario",
    load_failed: "Error al cargar el perfil. Inténtalo de nuevo.",
    created: "Perfil creado correctamente",
    updated: "Perfil actualizado correctamente",
    save_failed: "Ocurrió un error al actualizar el perfil. Inténtalo de nuevo.",
};


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    id: DocumentId,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    phone: String,
    /// `dd/mm/yyyy`, as typed by the user
    birth_date: String,
}

impl Profile {
    pub fn id(&self) -> &DocumentId      { &self.id         }
    pub fn email(&self) -> &str          { &self.email      }
    pub fn username(&self) -> &str       { &self.username   }
    pub fn first_name(&self) -> &str     { &self.first_name }
    pub fn last_name(&self) -> &str      { &self.last_name  }
    pub fn phone(&self) -> &str          { &self.phone      }
    pub fn birth_date(&self) -> &str     { &self.birth_date }

    /// How the user is greeted: the full name if both parts are known, else the username, else the email
    pub fn display_name(&self) -> String {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        if !first_name.is_empty() && !last_name.is_empty() {
            format!("{} {}", first_name, last_name)
        } else if !self.username.is_empty() {
            self.username.clone()
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            GUEST.to_string()
        }
    }
}

impl Record for Profile {
    fn collection(_owner: &OwnerId) -> CollectionPath {
        CollectionPath::new("users")
    }

    /// Every profile lives in the same collection, under the id of its owner
    fn belongs_to(id: &DocumentId, owner: &OwnerId) -> bool {
        id.as_str() == owner.as_str()
    }

    fn decode(doc: &Document, _now: DateTime<Utc>) -> Self {
        Self {
            id: doc.id().clone(),
            email: record::decode_text(doc, EMAIL),
            username: record::decode_text(doc, USERNAME),
            first_name: record::decode_text(doc, FIRST_NAME),
            last_name: record::decode_text(doc, LAST_NAME),
            phone: record::decode_text(doc, PHONE),
            birth_date: record::decode_text(doc, BIRTH_DATE),
        }
    }

    fn id(&self) -> &DocumentId { &self.id }
    fn title(&self) -> &str { &self.username }
    fn date(&self) -> Option<DateTime<Utc>> { None }

    fn messages() -> &'static RecordMessages {
        &MESSAGES
    }
}


#[derive(Clone, Debug, PartialEq)]
pub enum ProfileEdit {
    Username(String),
    FirstName(String),
    LastName(String),
    /// Raw keystrokes, only digits are kept
    Phone(String),
    /// Raw keystrokes, masked into `dd/mm/yyyy`
    BirthDate(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileDraft {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: String,
}

impl Draft for ProfileDraft {
    type Record = Profile;
    type Edit = ProfileEdit;

    fn from_record(profile: &Profile) -> Self {
        Self {
            username: profile.username.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: profile.phone.clone(),
            birth_date: profile.birth_date.clone(),
        }
    }

    fn apply(&mut self, edit: ProfileEdit, settings: &Settings) {
        match edit {
            ProfileEdit::Username(u) => self.username = mask::truncate_chars(&u, settings.title_max_chars),
            ProfileEdit::FirstName(n) => self.first_name = mask::truncate_chars(&n, settings.title_max_chars),
            ProfileEdit::LastName(n) => self.last_name = mask::truncate_chars(&n, settings.title_max_chars),
            ProfileEdit::Phone(p) => self.phone = mask::phone(&p),
            ProfileEdit::BirthDate(d) => self.birth_date = mask::day_month_year(&d),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_length(&mut issues, FIRST_NAME, &self.first_name, NAME_MIN_CHARS);
        check_length(&mut issues, LAST_NAME, &self.last_name, NAME_MIN_CHARS);
        check_length(&mut issues, USERNAME, &self.username, USERNAME_MIN_CHARS);
        if !self.phone.is_empty() && !mask::is_phone(&self.phone) {
            issues.push(FieldIssue::new(PHONE, Problem::Malformed));
        }
        if !self.birth_date.is_empty() && !mask::is_day_month_year(&self.birth_date) {
            issues.push(FieldIssue::new(BIRTH_DATE, Problem::Malformed));
        }
        ValidationError::check(issues)
    }

    /// Profiles are created at registration time, never from this form
    fn create_fields(&self) -> Option<Fields> {
        None
    }

    fn update_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(USERNAME.to_string(), self.username.trim().into());
        fields.insert(FIRST_NAME.to_string(), self.first_name.trim().into());
        fields.insert(LAST_NAME.to_string(), self.last_name.trim().into());
        fields.insert(PHONE.to_string(), self.phone.as_str().into());
        fields.insert(BIRTH_DATE.to_string(), self.birth_date.as_str().into());
        fields
    }
}

fn check_length(issues: &mut Vec<FieldIssue>, field: &'static str, value: &str, min: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        issues.push(FieldIssue::new(field, Problem::Required));
    } else if len < min {
        issues.push(FieldIssue::new(field, Problem::TooShort(min)));
    }
}
