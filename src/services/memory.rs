use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::selector::is_eligible;
use crate::models::{Interest, MatchEntry, NewProfile, Profile, User, UserId};
use crate::services::store::{RecordedInterest, Store, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    profiles: HashMap<Uuid, Profile>,
    interests: HashMap<(UserId, Uuid), Interest>,
}

impl Tables {
    fn owner_of(&self, profile_id: &Uuid) -> Option<UserId> {
        self.profiles.get(profile_id).map(|p| p.user_id)
    }

    /// True when `rater` has liked any profile, active or not, owned by `owner`
    fn has_liked_owner(&self, rater: UserId, owner: UserId) -> bool {
        self.interests.values().any(|i| {
            i.rater_id == rater && i.liked && self.owner_of(&i.target_profile_id) == Some(owner)
        })
    }

    /// Active profile, else the most recently created one
    fn snapshot_of(&self, user_id: UserId) -> Option<&Profile> {
        self.profiles
            .values()
            .filter(|p| p.user_id == user_id)
            .max_by_key(|p| (p.is_active, p.created_at))
    }
}

/// In-process store.
///
/// A single mutex guards all tables, so every trait call is one atomic
/// unit. Writes can be made to fail on demand to exercise storage-failure
/// handling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with [`StoreError::Unavailable`]
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes are disabled".to_string()));
        }
        Ok(())
    }

    /// Number of interest rows, for ledger invariants in tests
    pub async fn interest_count(&self) -> usize {
        self.tables.lock().await.interests.len()
    }

    /// Every profile ever stored for a user, active or not
    pub async fn profiles_of(&self, user_id: UserId) -> Vec<Profile> {
        let tables = self.tables.lock().await;
        let mut profiles: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        profiles.sort_by_key(|p| p.created_at);
        profiles
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_user(&self, user: &User) -> Result<User, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        tables.users.insert(user.user_id, user.clone());
        Ok(user.clone())
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }

    async fn active_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .profiles
            .values()
            .find(|p| p.user_id == user_id && p.is_active)
            .cloned())
    }

    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.tables.lock().await.profiles.get(&profile_id).cloned())
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;

        if !tables.users.contains_key(&profile.user_id) {
            return Err(StoreError::NotFound(format!("user {}", profile.user_id)));
        }
        if let Some(existing) = tables
            .profiles
            .values()
            .find(|p| p.user_id == profile.user_id && p.is_active)
        {
            return Err(StoreError::Conflict(format!(
                "user {} already has active profile {}",
                profile.user_id, existing.id
            )));
        }

        let created = profile.into_profile(Uuid::new_v4(), Utc::now());
        tables.profiles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn deactivate_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        let active = tables
            .profiles
            .values_mut()
            .find(|p| p.user_id == user_id && p.is_active);

        Ok(active.map(|profile| {
            profile.is_active = false;
            profile.clone()
        }))
    }

    async fn eligible_candidates(&self, requester: UserId) -> Result<Vec<Profile>, StoreError> {
        let tables = self.tables.lock().await;
        let rated: HashSet<Uuid> = tables
            .interests
            .keys()
            .filter(|(rater, _)| *rater == requester)
            .map(|(_, target)| *target)
            .collect();

        Ok(tables
            .profiles
            .values()
            .filter(|p| is_eligible(p, requester, &rated))
            .cloned()
            .collect())
    }

    async fn record_interest(
        &self,
        rater: UserId,
        target_profile: Uuid,
        liked: bool,
    ) -> Result<RecordedInterest, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;

        if !tables.users.contains_key(&rater) {
            return Err(StoreError::NotFound(format!("user {}", rater)));
        }
        let owner_id = match tables.profiles.get(&target_profile) {
            Some(profile) if profile.is_active => profile.user_id,
            Some(_) => {
                return Err(StoreError::NotFound(format!(
                    "profile {} is no longer active",
                    target_profile
                )))
            }
            None => return Err(StoreError::NotFound(format!("profile {}", target_profile))),
        };
        let target_owner = tables
            .users
            .get(&owner_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {}", owner_id)))?;

        let interest = Interest {
            rater_id: rater,
            target_profile_id: target_profile,
            liked,
            created_at: Utc::now(),
        };
        tables.interests.insert((rater, target_profile), interest.clone());

        let reciprocated = liked && tables.has_liked_owner(owner_id, rater);

        Ok(RecordedInterest {
            interest,
            target_owner,
            reciprocated,
        })
    }

    async fn get_interest(
        &self,
        rater: UserId,
        target_profile: Uuid,
    ) -> Result<Option<Interest>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.interests.get(&(rater, target_profile)).cloned())
    }

    async fn list_matches(&self, user_id: UserId) -> Result<Vec<MatchEntry>, StoreError> {
        let tables = self.tables.lock().await;

        let liked_owners: HashSet<UserId> = tables
            .interests
            .values()
            .filter(|i| i.rater_id == user_id && i.liked)
            .filter_map(|i| tables.owner_of(&i.target_profile_id))
            .filter(|owner| *owner != user_id)
            .collect();

        // BTreeMap keeps the order stable within one call
        let mut entries = BTreeMap::new();
        for other in liked_owners {
            if !tables.has_liked_owner(other, user_id) {
                continue;
            }
            let (Some(user), Some(profile)) = (tables.users.get(&other), tables.snapshot_of(other)) else {
                continue;
            };
            entries.insert(
                other,
                MatchEntry {
                    user: user.clone(),
                    profile: profile.clone(),
                },
            );
        }

        Ok(entries.into_values().collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(!self.fail_writes.load(Ordering::SeqCst))
    }
}
