//! An in-process document store
//!
//! [`MemoryStore`] behaves like a remote document database with live subscriptions, without any network.
//! It is used by integration tests (together with a [`MockBehaviour`] to inject failures) and by the demo binary.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::document::{CollectionPath, Document, DocumentId, DocumentPath, FieldValue, Fields, Snapshot};
use crate::mock_behaviour::MockBehaviour;
use crate::traits::{RemoteStore, SnapshotListener, StoreError, Subscription};


/// A call that has been made to a [`MemoryStore`], whether it succeeded or not
#[derive(Clone, Debug, PartialEq)]
pub enum StoreCall {
    Subscribe(CollectionPath),
    /// The fields are recorded as sent, i.e. before server timestamps are resolved
    Add(CollectionPath, Fields),
    Update(DocumentPath, Fields),
    Delete(DocumentPath),
}


/// A [`RemoteStore`] that keeps its documents in memory. Cloning it gives another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<CollectionPath, BTreeMap<DocumentId, Fields>>,
    listeners: Vec<RegisteredListener>,
    next_key: u64,
    behaviour: MockBehaviour,
    calls: Vec<StoreCall>,
    /// The "server clock". Uses the real time when `None`
    clock: Option<DateTime<Utc>>,
}

struct RegisteredListener {
    key: u64,
    path: CollectionPath,
    sender: SnapshotListener,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviour(behaviour: MockBehaviour) -> Self {
        let store = Self::new();
        store.set_behaviour(behaviour);
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        self.lock().behaviour = behaviour;
    }

    /// Freeze the time the store uses to resolve server timestamps
    pub fn set_clock(&self, now: DateTime<Utc>) {
        self.lock().clock = Some(now);
    }

    /// Insert or replace a document, bypassing the mock behaviour. Listeners are notified.
    pub fn seed(&self, path: &CollectionPath, id: DocumentId, fields: Fields) {
        let mut inner = self.lock();
        let now = inner.now();
        inner.collections.entry(path.clone()).or_default().insert(id, resolve(fields, now));
        inner.broadcast(path);
    }

    /// The current documents of a collection, ordered by id
    pub fn documents(&self, path: &CollectionPath) -> Vec<Document> {
        self.lock().snapshot(path).documents().to_vec()
    }

    /// Every call made to this store so far
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// How many live subscriptions exist for this collection
    pub fn listener_count(&self, path: &CollectionPath) -> usize {
        self.lock().listeners.iter().filter(|l| &l.path == path).count()
    }

    /// Break every subscription to this collection, as a server would do when permissions are revoked
    pub fn revoke(&self, path: &CollectionPath, reason: &str) {
        let mut inner = self.lock();
        let (revoked, kept): (Vec<_>, Vec<_>) = inner.listeners.drain(..).partition(|l| &l.path == path);
        inner.listeners = kept;
        for listener in revoked {
            log::info!("Revoking subscription #{} to {}", listener.key, path);
            let _ = listener.sender.send(Err(reason.to_string().into()));
        }
    }
}

impl Inner {
    fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }

    fn snapshot(&self, path: &CollectionPath) -> Snapshot {
        let documents = match self.collections.get(path) {
            None => Vec::new(),
            Some(docs) => docs.iter()
                .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                .collect(),
        };
        Snapshot::new(documents)
    }

    /// Push the current content of a collection to its listeners, forgetting the ones that went away
    fn broadcast(&mut self, path: &CollectionPath) {
        let snapshot = self.snapshot(path);
        self.listeners.retain(|listener| {
            if &listener.path != path {
                return true;
            }
            match listener.sender.send(Ok(snapshot.clone())) {
                Ok(()) => true,
                Err(_) => {
                    log::trace!("Listener #{} to {} is gone", listener.key, path);
                    false
                },
            }
        });
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Replace every server timestamp sentinel with the store clock
fn resolve(fields: Fields, now: DateTime<Utc>) -> Fields {
    fields.into_iter()
        .map(|(name, value)| {
            let value = match value {
                FieldValue::ServerTimestamp => FieldValue::Timestamp(now),
                FieldValue::Map(map) => FieldValue::Map(resolve(map, now)),
                other => other,
            };
            (name, value)
        })
        .collect()
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn subscribe(&self, path: &CollectionPath, listener: SnapshotListener) -> Result<Subscription, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Subscribe(path.clone()));
        inner.behaviour.can_subscribe()?;

        let key = inner.next_key;
        inner.next_key += 1;
        if listener.send(Ok(inner.snapshot(path))).is_err() {
            return Err(format!("Listener to {} was closed before subscribing", path).into());
        }
        inner.listeners.push(RegisteredListener { key, path: path.clone(), sender: listener });
        log::debug!("Subscription #{} to {} started", key, path);

        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                lock(&inner).listeners.retain(|l| l.key != key);
                log::debug!("Subscription #{} cancelled", key);
            }
        }))
    }

    async fn add(&self, path: &CollectionPath, fields: Fields) -> Result<DocumentId, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Add(path.clone(), fields.clone()));
        inner.behaviour.can_add()?;

        let id = DocumentId::random();
        let now = inner.now();
        inner.collections.entry(path.clone()).or_default().insert(id.clone(), resolve(fields, now));
        inner.broadcast(path);
        Ok(id)
    }

    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Update(path.clone(), fields.clone()));
        inner.behaviour.can_update()?;

        let now = inner.now();
        let document = inner.collections
            .get_mut(path.collection())
            .and_then(|docs| docs.get_mut(path.id()))
            .ok_or_else(|| format!("No document to update at {}", path))?;
        document.extend(resolve(fields, now));
        inner.broadcast(path.collection());
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Delete(path.clone()));
        inner.behaviour.can_delete()?;

        if let Some(docs) = inner.collections.get_mut(path.collection()) {
            docs.remove(path.id());
        }
        inner.broadcast(path.collection());
        Ok(())
    }
}
