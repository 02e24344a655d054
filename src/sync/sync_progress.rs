//! Utilities to publish the state of a synced list

use std::fmt::{Display, Error, Formatter};
use std::sync::Arc;

use crate::document::{CollectionPath, OwnerId};

/// Where a [`CollectionSync`](super::CollectionSync) stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Not subscribed (stopped, or nobody signed in)
    Idle,
    /// Subscribed, waiting for the first snapshot
    Loading,
    /// At least one snapshot has been received
    Synced,
    /// The subscription failed. Starting again retries it
    Error(String),
}

impl Display for SyncState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            SyncState::Idle => write!(f, "Idle"),
            SyncState::Loading => write!(f, "Loading..."),
            SyncState::Synced => write!(f, "Synced"),
            SyncState::Error(details) => write!(f, "Sync failed: {}", details),
        }
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::Idle
    }
}


/// What a screen needs to render a synced list
#[derive(Clone, Debug, PartialEq)]
pub struct ListState<R> {
    pub owner: Option<OwnerId>,
    pub state: SyncState,
    pub records: Arc<Vec<R>>,
    /// The very first load failed: the screen may show a dedicated error view instead of an empty list
    pub initial_load_failed: bool,
}

impl<R> ListState<R> {
    pub fn is_loading(&self) -> bool {
        self.state == SyncState::Loading
    }
}

impl<R> Default for ListState<R> {
    fn default() -> Self {
        Self {
            owner: None,
            state: SyncState::Idle,
            records: Arc::new(Vec::new()),
            initial_load_failed: false,
        }
    }
}


type FeedbackSender<R> = tokio::sync::watch::Sender<ListState<R>>;
/// Follows the content of a synced list, see [`CollectionSync::subscribe`](super::CollectionSync::subscribe)
pub type FeedbackReceiver<R> = tokio::sync::watch::Receiver<ListState<R>>;


/// Logs what happens to a synced collection, and republishes its state to the listeners (if any)
pub struct SyncProgress<R> {
    label: String,
    n_errors: u32,
    feedback_channel: FeedbackSender<R>,
}

impl<R> SyncProgress<R> {
    pub fn new() -> Self {
        let (sender, _) = tokio::sync::watch::channel(ListState::default());
        Self { label: "-".to_string(), n_errors: 0, feedback_channel: sender }
    }

    /// Prefix the next log lines with this collection
    pub fn set_collection(&mut self, path: Option<&CollectionPath>) {
        self.label = match path {
            Some(p) => p.to_string(),
            None => "-".to_string(),
        };
    }

    /// How many errors have been logged so far
    pub fn n_errors(&self) -> u32 {
        self.n_errors
    }

    /// Log an error
    pub fn error(&mut self, text: &str) {
        log::error!("[{}] {}", self.label, text);
        self.n_errors += 1;
    }
    /// Log a warning
    pub fn warn(&mut self, text: &str) {
        log::warn!("[{}] {}", self.label, text);
    }
    /// Log an info
    pub fn info(&mut self, text: &str) {
        log::info!("[{}] {}", self.label, text);
    }
    /// Log a debug message
    pub fn debug(&mut self, text: &str) {
        log::debug!("[{}] {}", self.label, text);
    }

    /// Publish a new state to the listeners. The value is kept even if nobody listens yet.
    pub fn feedback(&mut self, state: ListState<R>) {
        self.feedback_channel.send_replace(state);
    }

    /// A new receiver, that immediately sees the last published state
    pub fn subscribe(&self) -> FeedbackReceiver<R> {
        self.feedback_channel.subscribe()
    }
}

impl<R> Default for SyncProgress<R> {
    fn default() -> Self {
        Self::new()
    }
}
