use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Interest, MatchEntry, NewProfile, Profile, User, UserId};

/// Errors that can occur when talking to the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of an interest upsert together with the reciprocity read made
/// in the same atomic unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInterest {
    pub interest: Interest,
    /// Owner of the rated profile
    pub target_owner: User,
    /// True when the rating is a like and the target owner has liked any
    /// profile (active or not) owned by the rater. Always false for dislikes.
    pub reciprocated: bool,
}

/// Relational store behind the matchmaking core.
///
/// Every method is one atomic unit: implementations never leave a
/// partially written profile or interest behind.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create the user on first contact, refresh handle and display name after
    async fn upsert_user(&self, user: &User) -> Result<User, StoreError>;

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;

    async fn active_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Insert a new active profile.
    ///
    /// Fails with [`StoreError::Conflict`] when the user already owns an
    /// active profile; the check and the insert are serialized per user.
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, StoreError>;

    /// Flip the user's active profile to inactive, returning it.
    /// `Ok(None)` when there was nothing to deactivate.
    async fn deactivate_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    /// Active profiles not owned by `requester` and not yet rated by them
    async fn eligible_candidates(&self, requester: UserId) -> Result<Vec<Profile>, StoreError>;

    /// Upsert the (rater, target) rating and, for likes, check reciprocity.
    ///
    /// The write and the read are serialized against the reciprocal pair so
    /// two users liking each other concurrently cannot both miss the match.
    /// Fails with [`StoreError::NotFound`] when the target profile does not
    /// exist or is no longer active.
    async fn record_interest(
        &self,
        rater: UserId,
        target_profile: Uuid,
        liked: bool,
    ) -> Result<RecordedInterest, StoreError>;

    async fn get_interest(
        &self,
        rater: UserId,
        target_profile: Uuid,
    ) -> Result<Option<Interest>, StoreError>;

    /// Users mutually liked with `user_id`, recomputed from the ledger.
    /// Each entry carries the other user's active profile, or their most
    /// recent one when none is active.
    async fn list_matches(&self, user_id: UserId) -> Result<Vec<MatchEntry>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
