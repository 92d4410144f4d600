use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::onboarding::{Session, Step};
use crate::models::UserId;

/// Per-user slot; `None` when the user has no onboarding in flight
pub type SessionSlot = Option<Session>;

/// Keyed store of onboarding sessions with per-user mutual exclusion.
///
/// Every event for a user runs while holding that user's slot lock, so
/// duplicate submissions are applied one at a time in arrival order
/// (tokio's mutex is fair). Slots idle longer than the configured TTL are
/// evicted, which abandons any session they held.
#[derive(Clone)]
pub struct SessionStore {
    slots: moka::future::Cache<UserId, Arc<Mutex<SessionSlot>>>,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        let slots = moka::future::CacheBuilder::new(100_000)
            .time_to_idle(idle_ttl)
            .build();

        Self { slots }
    }

    /// Lock the user's slot, creating an empty one on first use. Only
    /// opening a session should call this.
    ///
    /// Empty slots are never removed explicitly: a waiter may already hold
    /// the `Arc`, and a fresh slot would let two events run concurrently.
    pub async fn lock(&self, user_id: UserId) -> OwnedMutexGuard<SessionSlot> {
        let slot = self
            .slots
            .get_with(user_id, async { Arc::new(Mutex::new(None)) })
            .await;

        slot.lock_owned().await
    }

    /// Lock the user's slot only if one already exists.
    ///
    /// Input that cannot open a session goes through here, so senders with
    /// no onboarding in flight never take up a slot.
    pub async fn lock_existing(&self, user_id: UserId) -> Option<OwnedMutexGuard<SessionSlot>> {
        let slot = self.slots.get(&user_id).await?;
        Some(slot.lock_owned().await)
    }

    /// Current step of the user's session, if one is open
    pub async fn step_of(&self, user_id: UserId) -> Option<Step> {
        let slot = self.slots.get(&user_id).await?;
        let guard = slot.lock().await;
        guard.as_ref().map(Session::step)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(1800))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::onboarding::Flow;

    #[tokio::test]
    async fn test_slot_persists_between_locks() {
        let store = SessionStore::default();
        {
            let mut slot = store.lock(1).await;
            *slot = Some(Session::new(1, &Flow::default()));
        }
        assert_eq!(store.step_of(1).await, Some(Step::AwaitingName));
        assert_eq!(store.step_of(2).await, None);
    }

    #[tokio::test]
    async fn test_same_user_is_serialized() {
        let store = SessionStore::default();
        let guard = store.lock(1).await;

        let contender = {
            let store = store.clone();
            tokio::spawn(async move {
                let mut slot = store.lock(1).await;
                *slot = Some(Session::new(1, &Flow::default()));
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        assert!(guard.is_none());

        drop(guard);
        contender.await.unwrap();
        assert!(store.step_of(1).await.is_some());
    }

    #[tokio::test]
    async fn test_lock_existing_does_not_create_slots() {
        let store = SessionStore::default();
        assert!(store.lock_existing(1).await.is_none());
        assert!(!store.slots.contains_key(&1));

        drop(store.lock(1).await);
        let guard = store.lock_existing(1).await;
        assert!(guard.is_some_and(|slot| slot.is_none()));
    }

    #[tokio::test]
    async fn test_other_users_do_not_block() {
        let store = SessionStore::default();
        let _held = store.lock(1).await;

        let other = tokio::time::timeout(Duration::from_millis(200), store.lock(2)).await;
        assert!(other.is_ok());
    }
}
