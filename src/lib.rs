//! This crate keeps the lists of the Tembiapo student planner (tasks, calendar events and the user profile) in sync with a remote document store.
//!
//! A [`CollectionSync`](sync::CollectionSync) mirrors the collection of the signed-in user, and is refreshed every time the store sends a new snapshot. \
//! A [`FormState`](form::FormState) holds a draft, validates it, and writes it to the store. It never touches the synced list: the change shows up
//! there once the store sends it back. \
//! A [`ViewProjection`](view::ViewProjection) computes the read-only views of a list (month, day, upcoming, counters).
//!
//! The store, the authentication service and the user notifications are traits (see the [`traits`] module), so that they can be replaced by fakes. \
//! This crate provides an in-memory store ([`MemoryStore`](store::MemoryStore)), that is used by the tests and the demo binary.

pub mod traits;
pub mod document;
pub mod error;

pub mod record;
mod task;
pub use task::{Task, TaskDraft, TaskEdit};
mod event;
pub use event::{Event, EventDraft, EventEdit, EventKind};
mod profile;
pub use profile::{Profile, ProfileDraft, ProfileEdit};

pub mod sync;
pub use sync::CollectionSync;
pub mod form;
pub use form::{FormState, RecordActions};
pub mod view;
pub use view::ViewProjection;

pub mod store;
pub use store::MemoryStore;
pub mod mock_behaviour;
pub mod auth;
pub mod notify;

pub mod mask;
pub mod config;
pub mod logging;
