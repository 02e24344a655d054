//! Glue between a screen lifecycle, the signed-in user and a [`CollectionSync`]

use std::future::Future;

use tokio::sync::watch;

use crate::document::OwnerId;
use crate::record::Record;
use crate::traits::RemoteStore;
use super::CollectionSync;

/// Keep `sync` subscribed to the collection of whoever is signed in, until `blur` resolves.
///
/// * snapshots are applied as they arrive
/// * when the user changes, the previous subscription is stopped before the new one starts
/// * signing out empties the list
///
/// The sync is stopped when this returns, either because `blur` resolved or because the auth channel was closed.
pub async fn follow_auth<R, S, F>(sync: &mut CollectionSync<R, S>, mut owners: watch::Receiver<Option<OwnerId>>, blur: F)
where
    R: Record,
    S: RemoteStore + ?Sized,
    F: Future<Output = ()>,
{
    let first_owner = owners.borrow().clone();
    sync.start(first_owner);

    tokio::pin!(blur);
    loop {
        tokio::select! {
            _ = &mut blur => {
                log::debug!("Screen lost focus");
                break;
            },
            changed = owners.changed() => {
                if changed.is_err() {
                    log::warn!("Auth provider went away, stopping the sync");
                    break;
                }
                let owner = owners.borrow().clone();
                if sync.owner() != owner.as_ref() {
                    sync.start(owner);
                }
            },
            _ = sync.next(), if sync.is_subscribed() => {},
        }
    }

    sync.stop();
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio::sync::oneshot;

    use crate::auth::SessionAuth;
    use crate::document::{DocumentId, Fields};
    use crate::notify::RecordingNotifier;
    use crate::store::MemoryStore;
    use crate::sync::sync_progress::{FeedbackReceiver, ListState, SyncState};
    use crate::task::Task;
    use crate::traits::AuthProvider;

    async fn wait_for<F>(lists: &mut FeedbackReceiver<Task>, condition: F)
    where
        F: Fn(&ListState<Task>) -> bool,
    {
        loop {
            if condition(&lists.borrow()) {
                return;
            }
            lists.changed().await.unwrap();
        }
    }

    fn is_synced_for(list: &ListState<Task>, owner: &str) -> bool {
        list.state == SyncState::Synced && list.owner == Some(OwnerId::new(owner))
    }

    #[tokio::test]
    async fn follows_the_signed_in_user() {
        let _ = env_logger::builder().is_test(true).try_init();

        let store = MemoryStore::new();
        let auth = SessionAuth::new();
        auth.sign_in(OwnerId::new("ana"));
        let mut sync: CollectionSync<Task, _> = CollectionSync::new(Arc::new(store.clone()), Arc::new(RecordingNotifier::new()));
        let mut lists = sync.subscribe();
        let (blur_tx, blur_rx) = oneshot::channel::<()>();

        let driver = async {
            wait_for(&mut lists, |l| is_synced_for(l, "ana")).await;

            let mut fields = Fields::new();
            fields.insert("titulo".to_string(), "Leer".into());
            store.seed(&Task::collection(&OwnerId::new("ana")), DocumentId::new("t1"), fields);
            wait_for(&mut lists, |l| l.records.len() == 1).await;

            auth.sign_in(OwnerId::new("beto"));
            wait_for(&mut lists, |l| is_synced_for(l, "beto")).await;
            assert!(lists.borrow().records.is_empty());
            assert_eq!(store.listener_count(&Task::collection(&OwnerId::new("ana"))), 0);

            auth.sign_out();
            wait_for(&mut lists, |l| l.owner.is_none()).await;

            blur_tx.send(()).unwrap();
        };

        let blur = async {
            let _ = blur_rx.await;
        };
        tokio::join!(follow_auth(&mut sync, auth.watch_owner(), blur), driver);

        assert_eq!(sync.state(), &SyncState::Idle);
        assert!(!sync.is_subscribed());
        assert!(sync.records().is_empty());
    }

    #[tokio::test]
    async fn blur_stops_the_subscription() {
        let store = MemoryStore::new();
        let auth = SessionAuth::signed_in(OwnerId::new("ana"));
        let mut sync: CollectionSync<Task, _> = CollectionSync::new(Arc::new(store.clone()), Arc::new(RecordingNotifier::new()));

        follow_auth(&mut sync, auth.watch_owner(), async {}).await;

        assert_eq!(store.listener_count(&Task::collection(&OwnerId::new("ana"))), 0);
        assert_eq!(sync.state(), &SyncState::Idle);
        assert_eq!(sync.owner(), auth.current_owner().as_ref());
    }
}
