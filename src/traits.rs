//! The collaborators the sync core talks to.
//!
//! None of them is a global: they are all handed to the components that need them,
//! so that tests can replace them with fakes.

use std::error::Error;
use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::document::{CollectionPath, DocumentId, DocumentPath, Fields, OwnerId, Snapshot};

/// Errors reported by a remote store
pub type StoreError = Box<dyn Error + Send + Sync>;

/// What a subscription listener receives: either a full snapshot, or the error that ended the subscription
pub type SnapshotMessage = Result<Snapshot, StoreError>;
/// The sending half a store pushes snapshots into
pub type SnapshotListener = mpsc::UnboundedSender<SnapshotMessage>;


/// A remote document database, with live subscriptions
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Start listening to a collection.
    ///
    /// The current content of the collection is pushed to `listener` as soon as possible, then again after every change.
    /// If the subscription breaks later on, a single `Err` is pushed and nothing else will follow.
    fn subscribe(&self, path: &CollectionPath, listener: SnapshotListener) -> Result<Subscription, StoreError>;

    /// Add a new document and return the id the store has picked for it
    async fn add(&self, path: &CollectionPath, fields: Fields) -> Result<DocumentId, StoreError>;
    /// Overwrite the given fields of an existing document. Other fields are left untouched
    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError>;
    /// Delete a document
    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError>;
}


/// A live subscription. It is cancelled when this handle is dropped (or when [`Subscription::cancel`] is called)
pub struct Subscription {
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new<F>(on_cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { on_cancel: Some(Box::new(on_cancel)) }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(f) = self.on_cancel.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.on_cancel.is_some())
            .finish()
    }
}


/// Tells who is currently signed in
pub trait AuthProvider: Send + Sync {
    /// The current user, or `None` when signed out
    fn current_owner(&self) -> Option<OwnerId>;
    /// A receiver that is notified every time the current user changes
    fn watch_owner(&self) -> watch::Receiver<Option<OwnerId>>;
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// A short, dismissible message for the user (a toast or an alert)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success<T: ToString, M: ToString>(title: T, message: M) -> Self {
        Self { kind: NoticeKind::Success, title: title.to_string(), message: message.to_string() }
    }
    pub fn info<T: ToString, M: ToString>(title: T, message: M) -> Self {
        Self { kind: NoticeKind::Info, title: title.to_string(), message: message.to_string() }
    }
    pub fn error<T: ToString, M: ToString>(title: T, message: M) -> Self {
        Self { kind: NoticeKind::Error, title: title.to_string(), message: message.to_string() }
    }
}

/// Fire-and-forget user notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}


/// The question asked before a destructive action
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
}

/// A cancel/confirm dialog
#[async_trait]
pub trait Confirmation: Send + Sync {
    /// Returns `true` only if the user explicitly confirmed
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}
