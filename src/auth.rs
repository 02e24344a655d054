//! An in-process session, standing in for a real authentication service

use tokio::sync::watch;

use crate::document::OwnerId;
use crate::traits::AuthProvider;

/// Holds who is currently signed in, and tells the interested parties when this changes
pub struct SessionAuth {
    current: watch::Sender<Option<OwnerId>>,
}

impl SessionAuth {
    /// A session where nobody is signed in yet
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    pub fn signed_in(owner: OwnerId) -> Self {
        let session = Self::new();
        session.sign_in(owner);
        session
    }

    pub fn sign_in(&self, owner: OwnerId) {
        log::info!("User {} signed in", owner);
        self.current.send_replace(Some(owner));
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.current.send_replace(None) {
            log::info!("User {} signed out", previous);
        }
    }
}

impl Default for SessionAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for SessionAuth {
    fn current_owner(&self) -> Option<OwnerId> {
        self.current.borrow().clone()
    }

    fn watch_owner(&self) -> watch::Receiver<Option<OwnerId>> {
        self.current.subscribe()
    }
}
