//! This module keeps an in-memory list of records in sync with a remote collection
//!
//! A [`CollectionSync`] owns one live subscription at a time. Every snapshot the store delivers replaces the whole list;
//! local writes never touch it directly, they only become visible once the store sends the snapshot that contains them.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::document::{CollectionPath, OwnerId, Snapshot};
use crate::error::SubscriptionError;
use crate::record::Record;
use crate::traits::{Notice, Notifier, RemoteStore, SnapshotMessage, StoreError, Subscription};

pub mod sync_progress;
pub mod lifecycle;
use sync_progress::{FeedbackReceiver, ListState, SyncProgress, SyncState};


/// The subscription currently feeding the list.
///
/// Each subscription has its own channel: once it is dropped, whatever the store still sends to it is lost,
/// so a late snapshot can never reach the list of another subscription.
struct ActiveSubscription {
    path: CollectionPath,
    receiver: mpsc::UnboundedReceiver<SnapshotMessage>,
    _subscription: Subscription,
}


/// An always-current list of the records of an owner-scoped remote collection
pub struct CollectionSync<R, S>
where
    R: Record,
    S: RemoteStore + ?Sized,
{
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,

    owner: Option<OwnerId>,
    state: SyncState,
    records: Arc<Vec<R>>,
    initial_load_failed: bool,
    active: Option<ActiveSubscription>,

    progress: SyncProgress<R>,
}

impl<R, S> CollectionSync<R, S>
where
    R: Record,
    S: RemoteStore + ?Sized,
{
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store, notifier,
            owner: None,
            state: SyncState::Idle,
            records: Arc::new(Vec::new()),
            initial_load_failed: false,
            active: None,
            progress: SyncProgress::new(),
        }
    }

    pub fn owner(&self) -> Option<&OwnerId> { self.owner.as_ref() }
    pub fn state(&self) -> &SyncState { &self.state }
    pub fn records(&self) -> &[R] { &self.records }
    pub fn is_loading(&self) -> bool { self.state == SyncState::Loading }
    /// Whether a subscription is currently live
    pub fn is_subscribed(&self) -> bool { self.active.is_some() }
    /// Whether the subscription failed before delivering anything
    pub fn initial_load_failed(&self) -> bool { self.initial_load_failed }
    /// How many subscription errors happened since this sync was created
    pub fn n_errors(&self) -> u32 { self.progress.n_errors() }

    /// The current list and its state, as published to the listeners
    pub fn list_state(&self) -> ListState<R> {
        ListState {
            owner: self.owner.clone(),
            state: self.state.clone(),
            records: Arc::clone(&self.records),
            initial_load_failed: self.initial_load_failed,
        }
    }

    /// A receiver that is notified every time the list or its state changes
    pub fn subscribe(&self) -> FeedbackReceiver<R> {
        self.progress.subscribe()
    }

    /// Subscribe to the collection of `owner`.
    ///
    /// Any previous subscription is stopped first. With no owner (nobody signed in), the list is emptied and nothing is subscribed.
    /// This is also the way to retry after an error.
    pub fn start(&mut self, owner: Option<OwnerId>) {
        self.stop();

        if owner != self.owner {
            self.records = Arc::new(Vec::new());
        }
        self.owner = owner;
        self.initial_load_failed = false;

        let owner = match &self.owner {
            None => {
                self.progress.set_collection(None);
                self.progress.info("No authenticated user, nothing to subscribe to");
                self.publish();
                return;
            },
            Some(owner) => owner.clone(),
        };

        let path = R::collection(&owner);
        self.progress.set_collection(Some(&path));
        self.progress.info("Subscribing");
        self.state = SyncState::Loading;

        let (sender, receiver) = mpsc::unbounded_channel();
        match self.store.subscribe(&path, sender) {
            Ok(subscription) => {
                self.active = Some(ActiveSubscription { path, receiver, _subscription: subscription });
                self.publish();
            },
            Err(err) => self.fail(path, err),
        }
    }

    /// Cancel the current subscription, if any. Nothing the store sends afterwards will reach this list.
    ///
    /// The last-known records are kept, so that a screen coming back into focus shows them while reloading.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            self.progress.info(&format!("Unsubscribing from {}", active.path));
        }
        if self.state != SyncState::Idle {
            self.state = SyncState::Idle;
            self.publish();
        }
    }

    /// Apply every message that is already waiting, without blocking. Returns how many were applied
    pub fn process_pending(&mut self) -> usize {
        let mut n_applied = 0;
        loop {
            let message = match self.active.as_mut() {
                None => break,
                Some(active) => active.receiver.try_recv(),
            };
            match message {
                Ok(message) => {
                    self.apply(message);
                    n_applied += 1;
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed_by_store();
                    break;
                },
            }
        }
        n_applied
    }

    /// Wait for the next message of the current subscription and apply it.
    ///
    /// Returns `false` right away if there is no live subscription.
    pub async fn next(&mut self) -> bool {
        let message = match self.active.as_mut() {
            None => return false,
            Some(active) => active.receiver.recv().await,
        };
        match message {
            Some(message) => self.apply(message),
            None => self.closed_by_store(),
        }
        true
    }

    fn apply(&mut self, message: SnapshotMessage) {
        match message {
            Ok(snapshot) => self.replace(snapshot),
            Err(err) => {
                let path = match self.active.take() {
                    Some(active) => active.path,
                    None => return,
                };
                self.fail(path, err);
            },
        }
    }

    fn replace(&mut self, snapshot: Snapshot) {
        let owner = match &self.owner {
            Some(owner) => owner.clone(),
            None => return,
        };
        let now = Utc::now();
        let mut records = Vec::with_capacity(snapshot.len());
        for doc in snapshot.documents() {
            if R::belongs_to(doc.id(), &owner) {
                records.push(R::decode(doc, now));
            } else {
                self.progress.warn(&format!("Ignoring {}, that does not belong to {}", doc.id(), owner));
            }
        }
        self.progress.debug(&format!("Snapshot with {} documents", records.len()));

        if self.state == SyncState::Loading {
            self.progress.info("First snapshot received");
        }
        self.state = SyncState::Synced;
        self.records = Arc::new(records);
        self.publish();
    }

    fn closed_by_store(&mut self) {
        if let Some(active) = self.active.take() {
            self.fail(active.path, "the store closed the subscription".into());
        }
    }

    /// The subscription is over. Keep the last-known list, and tell the user
    fn fail(&mut self, path: CollectionPath, source: StoreError) {
        let err = SubscriptionError { path, source };
        self.progress.error(&err.to_string());
        self.initial_load_failed = self.state == SyncState::Loading;
        self.state = SyncState::Error(err.source.to_string());
        self.notifier.notify(Notice::error("Error", R::messages().load_failed));
        self.publish();
    }

    fn publish(&mut self) {
        let state = self.list_state();
        self.progress.feedback(state);
    }

    /// Start syncing for a screen that gains focus. The sync is stopped when the returned guard is dropped
    pub fn focus(&mut self, owner: Option<OwnerId>) -> Focused<'_, R, S> {
        self.start(owner);
        Focused { sync: self }
    }
}

impl<R, S> Drop for CollectionSync<R, S>
where
    R: Record,
    S: RemoteStore + ?Sized,
{
    fn drop(&mut self) {
        self.stop();
    }
}


/// A [`CollectionSync`] bound to a focused screen. Dropping this stops the subscription (the screen lost focus or went away)
pub struct Focused<'a, R, S>
where
    R: Record,
    S: RemoteStore + ?Sized,
{
    sync: &'a mut CollectionSync<R, S>,
}

impl<'a, R, S> Deref for Focused<'a, R, S>
where
    R: Record,
    S: RemoteStore + ?Sized,
{
    type Target = CollectionSync<R, S>;
    fn deref(&self) -> &Self::Target {
        &*self.sync
    }
}

impl<'a, R, S> DerefMut for Focused<'a, R, S>
where
    R: Record,
    S: RemoteStore + ?Sized,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.sync
    }
}

impl<'a, R, S> Drop for Focused<'a, R, S>
where
    R: Record,
    S: RemoteStore + ?Sized,
{
    fn drop(&mut self) {
        self.sync.stop();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentId, Fields};
    use crate::notify::RecordingNotifier;
    use crate::store::{MemoryStore, StoreCall};
    use crate::mock_behaviour::MockBehaviour;
    use crate::task::Task;

    fn setup(store: &MemoryStore) -> (CollectionSync<Task, MemoryStore>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let sync = CollectionSync::new(Arc::new(store.clone()), notifier.clone());
        (sync, notifier)
    }

    fn task_fields(title: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("titulo".to_string(), title.into());
        fields
    }

    #[test]
    fn state_machine() {
        let store = MemoryStore::new();
        let (mut sync, _) = setup(&store);
        let owner = OwnerId::new("u1");
        assert_eq!(sync.state(), &SyncState::Idle);

        sync.start(Some(owner.clone()));
        assert_eq!(sync.state(), &SyncState::Loading);
        assert!(sync.is_loading());

        assert_eq!(sync.process_pending(), 1);
        assert_eq!(sync.state(), &SyncState::Synced);

        store.seed(&Task::collection(&owner), DocumentId::new("a"), task_fields("A"));
        assert_eq!(sync.process_pending(), 1);
        assert_eq!(sync.state(), &SyncState::Synced);
        assert_eq!(sync.records().len(), 1);

        sync.stop();
        assert_eq!(sync.state(), &SyncState::Idle);
        sync.stop();
        assert_eq!(sync.state(), &SyncState::Idle);
        assert_eq!(store.listener_count(&Task::collection(&owner)), 0);
    }

    #[test]
    fn subscribe_failure_then_retry() {
        let store = MemoryStore::with_behaviour(MockBehaviour {
            subscribe_behaviour: (0, 1),
            ..MockBehaviour::default()
        });
        let (mut sync, notifier) = setup(&store);
        let owner = OwnerId::new("u1");

        sync.start(Some(owner.clone()));
        assert!(matches!(sync.state(), SyncState::Error(_)));
        assert!(sync.initial_load_failed());
        assert!(!sync.is_loading());
        assert_eq!(notifier.notices().len(), 1);

        sync.start(Some(owner));
        sync.process_pending();
        assert_eq!(sync.state(), &SyncState::Synced);
        assert!(!sync.initial_load_failed());
        assert_eq!(sync.n_errors(), 1);
    }

    #[test]
    fn refocusing_never_piles_up_subscriptions() {
        let store = MemoryStore::new();
        let (mut sync, _) = setup(&store);
        let owner = OwnerId::new("u1");
        let path = Task::collection(&owner);
        store.seed(&path, DocumentId::new("a"), task_fields("A"));

        for _ in 0..5 {
            {
                let mut focused = sync.focus(Some(owner.clone()));
                assert_eq!(store.listener_count(&path), 1);
                focused.process_pending();
                assert_eq!(focused.records().len(), 1);
            }
            assert_eq!(store.listener_count(&path), 0);
        }
        let subscribe_calls = store.calls().iter().filter(|call| matches!(call, StoreCall::Subscribe(_))).count();
        assert_eq!(subscribe_calls, 5);
    }

    #[test]
    fn focus_guard_stops_on_drop() {
        let store = MemoryStore::new();
        let (mut sync, _) = setup(&store);
        let owner = OwnerId::new("u1");
        {
            let mut focused = sync.focus(Some(owner.clone()));
            focused.process_pending();
            assert_eq!(store.listener_count(&Task::collection(&owner)), 1);
        }
        assert_eq!(store.listener_count(&Task::collection(&owner)), 0);
        assert_eq!(sync.state(), &SyncState::Idle);
    }
}
