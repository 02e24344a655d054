//! Editing records: the form a user fills in, and the one-tap actions of a list
//!
//! Forms never touch a [`CollectionSync`](crate::sync::CollectionSync). A successful write only becomes visible
//! once the store delivers the snapshot that contains it.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::watch;

use crate::config::Settings;
use crate::document::{DocumentId, Fields, OwnerId};
use crate::error::{FormError, Problem, ValidationError, WriteError, WriteOp};
use crate::record::{Deletable, Record};
use crate::task::Task;
use crate::traits::{ConfirmPrompt, Confirmation, Notice, Notifier, RemoteStore};

const ERROR_TITLE: &str = "Error";
const SUCCESS_TITLE: &str = "Éxito";
const NO_USER: &str = "No se encontró un usuario autenticado.";
const TOGGLE_FAILED: &str = "No se pudo actualizar el estado de la nota";
const NOT_OWNED: &str = "Este registro no pertenece a tu cuenta.";


/// The local, editable copy of a record
pub trait Draft: Clone + Debug + Default + Send + Sync + 'static {
    type Record: Record;
    /// A single change of a form field, as the user types it
    type Edit;

    /// Copy the editable fields of an existing record
    fn from_record(record: &Self::Record) -> Self;

    /// Apply an edit. Inputs with a format (times, dates, phone numbers) are masked here, and lengths are capped
    fn apply(&mut self, edit: Self::Edit, settings: &Settings);

    fn validate(&self) -> Result<(), ValidationError>;

    /// The fields of a brand new document, or `None` if this kind of record cannot be created from a form
    fn create_fields(&self) -> Option<Fields>;

    /// The fields written over an existing document
    fn update_fields(&self) -> Fields;
}


/// What a successful [`FormState::submit`] did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(DocumentId),
    Updated(DocumentId),
}

/// What a delete request ended up doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user did not confirm. Nothing has been sent to the store
    Cancelled,
    Deleted,
}


/// Actions that write to the store straight from a list, without going through a form
pub struct RecordActions<S: RemoteStore + ?Sized> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    owner: Option<OwnerId>,
}

impl<S: RemoteStore + ?Sized> RecordActions<S> {
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier, owner: None }
    }

    pub fn owner(&self) -> Option<&OwnerId> { self.owner.as_ref() }

    pub fn set_owner(&mut self, owner: Option<OwnerId>) {
        self.owner = owner;
    }

    fn require_owner(&self) -> Result<OwnerId, FormError> {
        match &self.owner {
            Some(owner) => Ok(owner.clone()),
            None => {
                log::warn!("Write attempted while signed out");
                self.notifier.notify(Notice::error(ERROR_TITLE, NO_USER));
                Err(FormError::Unauthenticated)
            },
        }
    }

    /// Refuse to write a document of `R` that is not one of `owner`'s records
    fn require_ownership<R: Record>(&self, id: &DocumentId, owner: &OwnerId) -> Result<(), FormError> {
        if R::belongs_to(id, owner) {
            return Ok(());
        }
        log::warn!("{} tried to write {}, that belongs to someone else", owner, id);
        self.notifier.notify(Notice::error(ERROR_TITLE, NOT_OWNED));
        Err(FormError::NotOwned(id.clone()))
    }

    /// Delete a record, once the user has confirmed it.
    ///
    /// Only record kinds that can be deleted from a list have this action. A profile cannot:
    ///
    /// ```compile_fail
    /// # use std::sync::Arc;
    /// # use tembiapo_sync::{MemoryStore, Profile, RecordActions};
    /// # use tembiapo_sync::document::DocumentId;
    /// # use tembiapo_sync::notify::{LogNotifier, ScriptedConfirmation};
    /// # async fn f() {
    /// let actions = RecordActions::new(Arc::new(MemoryStore::new()), Arc::new(LogNotifier));
    /// actions.delete::<Profile>(&DocumentId::new("beto"), &ScriptedConfirmation::accepting()).await;
    /// # }
    /// ```
    pub async fn delete<R: Deletable>(&self, id: &DocumentId, confirmation: &dyn Confirmation) -> Result<DeleteOutcome, FormError> {
        let owner = self.require_owner()?;
        self.require_ownership::<R>(id, &owner)?;
        let messages = R::delete_messages();

        let prompt = ConfirmPrompt {
            title: messages.title.to_string(),
            message: messages.question.to_string(),
        };
        if !confirmation.confirm(&prompt).await {
            log::debug!("Deletion of {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        let path = R::collection(&owner).doc(id);
        match self.store.delete(&path).await {
            Ok(()) => {
                log::info!("Deleted {}", path);
                self.notifier.notify(Notice::success(SUCCESS_TITLE, messages.deleted));
                Ok(DeleteOutcome::Deleted)
            },
            Err(err) => {
                let err = WriteError::on_document(WriteOp::Delete, &path, err);
                log::error!("{}", err);
                self.notifier.notify(Notice::error(ERROR_TITLE, messages.failed));
                Err(err.into())
            },
        }
    }

    /// Flip the completion flag of a task
    pub async fn toggle_completed(&self, task: &Task) -> Result<(), FormError> {
        let owner = self.require_owner()?;
        let path = Task::collection(&owner).doc(task.id());
        match self.store.update(&path, task.toggle_fields()).await {
            Ok(()) => {
                log::debug!("Task {} is now {}", path, if task.completed() { "pending" } else { "completed" });
                Ok(())
            },
            Err(err) => {
                let err = WriteError::on_document(WriteOp::Update, &path, err);
                log::error!("{}", err);
                self.notifier.notify(Notice::error(ERROR_TITLE, TOGGLE_FAILED));
                Err(err.into())
            },
        }
    }
}


/// A create/edit form for one kind of record
pub struct FormState<D, S>
where
    D: Draft,
    S: RemoteStore + ?Sized,
{
    actions: RecordActions<S>,
    settings: Settings,

    draft: D,
    /// The record being edited, `None` when creating a new one
    editing: Option<DocumentId>,
    visible: bool,
    submitting: watch::Sender<bool>,
    problems: BTreeMap<&'static str, Problem>,
}

impl<D, S> FormState<D, S>
where
    D: Draft,
    S: RemoteStore + ?Sized,
{
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>, settings: Settings) -> Self {
        let (submitting, _) = watch::channel(false);
        Self {
            actions: RecordActions::new(store, notifier),
            settings,
            draft: D::default(),
            editing: None,
            visible: false,
            submitting,
            problems: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> Option<&OwnerId> { self.actions.owner() }
    pub fn draft(&self) -> &D { &self.draft }
    pub fn editing(&self) -> Option<&DocumentId> { self.editing.as_ref() }
    pub fn is_visible(&self) -> bool { self.visible }
    pub fn is_submitting(&self) -> bool { *self.submitting.borrow() }
    /// The fields that failed the last validation, if it has not been fixed since
    pub fn field_problems(&self) -> &BTreeMap<&'static str, Problem> { &self.problems }

    /// Follow the `submitting` flag, e.g. to disable a "save" button
    pub fn watch_submitting(&self) -> watch::Receiver<bool> {
        self.submitting.subscribe()
    }

    /// The user the records will be written for
    pub fn set_owner(&mut self, owner: Option<OwnerId>) {
        self.actions.set_owner(owner);
    }

    /// Show a blank form
    pub fn open_for_create(&mut self) {
        self.open_with(D::default());
    }

    /// Show a form pre-filled with `draft`, for a new record
    pub fn open_with(&mut self, draft: D) {
        self.draft = draft;
        self.editing = None;
        self.problems.clear();
        self.visible = true;
    }

    /// Show a form filled with a copy of an existing record
    pub fn open_for_edit(&mut self, record: &D::Record) {
        self.draft = D::from_record(record);
        self.editing = Some(record.id().clone());
        self.problems.clear();
        self.visible = true;
    }

    pub fn set_field(&mut self, edit: D::Edit) {
        self.draft.apply(edit, &self.settings);
        if !self.problems.is_empty() {
            self.problems = problems_of(&self.draft);
        }
    }

    /// Hide the form and forget the draft
    pub fn close(&mut self) {
        self.visible = false;
        self.draft = D::default();
        self.editing = None;
        self.problems.clear();
    }

    /// Validate the draft, then add or update it.
    ///
    /// On success the form is closed. On failure the user is notified and the draft is kept, so that they can retry.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        let messages = <D::Record as Record>::messages();
        let owner = self.actions.require_owner()?;
        if let Some(id) = &self.editing {
            self.actions.require_ownership::<D::Record>(id, &owner)?;
        }

        if let Err(err) = self.draft.validate() {
            log::debug!("Not submitting: {}", err);
            self.problems = err.issues.iter().map(|issue| (issue.field, issue.problem)).collect();
            self.actions.notifier.notify(Notice::error(ERROR_TITLE, messages.invalid));
            return Err(err.into());
        }
        self.problems.clear();

        let collection = <D::Record as Record>::collection(&owner);
        let store = Arc::clone(&self.actions.store);

        self.submitting.send_replace(true);
        let result: Result<SubmitOutcome, FormError> = match &self.editing {
            Some(id) => {
                let path = collection.doc(id);
                store.update(&path, self.draft.update_fields()).await
                    .map(|()| SubmitOutcome::Updated(id.clone()))
                    .map_err(|err| WriteError::on_document(WriteOp::Update, &path, err).into())
            },
            None => match self.draft.create_fields() {
                None => Err(FormError::EditOnly),
                Some(fields) => store.add(&collection, fields).await
                    .map(SubmitOutcome::Created)
                    .map_err(|err| WriteError::on_collection(WriteOp::Add, &collection, err).into()),
            },
        };
        self.submitting.send_replace(false);

        match result {
            Ok(outcome) => {
                log::info!("{:?} in {}", outcome, collection);
                let message = match outcome {
                    SubmitOutcome::Created(_) => messages.created,
                    SubmitOutcome::Updated(_) => messages.updated,
                };
                self.actions.notifier.notify(Notice::success(SUCCESS_TITLE, message));
                self.close();
                Ok(outcome)
            },
            Err(err) => {
                log::error!("Unable to save the form: {}", err);
                self.actions.notifier.notify(Notice::error(ERROR_TITLE, messages.save_failed));
                Err(err)
            },
        }
    }

}

impl<D, S> FormState<D, S>
where
    D: Draft,
    D::Record: Deletable,
    S: RemoteStore + ?Sized,
{
    /// Delete a record after confirmation. The form is closed if that record was being edited
    pub async fn delete(&mut self, id: &DocumentId, confirmation: &dyn Confirmation) -> Result<DeleteOutcome, FormError> {
        let outcome = self.actions.delete::<D::Record>(id, confirmation).await?;
        if outcome == DeleteOutcome::Deleted && self.editing.as_ref() == Some(id) {
            self.close();
        }
        Ok(outcome)
    }
}

fn problems_of<D: Draft>(draft: &D) -> BTreeMap<&'static str, Problem> {
    match draft.validate() {
        Ok(()) => BTreeMap::new(),
        Err(err) => err.issues.into_iter().map(|issue| (issue.field, issue.problem)).collect(),
    }
}
