use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::CoreError;
use crate::models::{Profile, UserId};
use crate::services::Store;

/// A profile may be shown to `requester` when it is active, owned by
/// someone else, and not yet rated by them
#[inline]
pub fn is_eligible(profile: &Profile, requester: UserId, rated: &HashSet<Uuid>) -> bool {
    profile.is_active && profile.user_id != requester && !rated.contains(&profile.id)
}

/// Uniform pick; no ranking of any kind
pub fn choose_uniform<R: Rng + ?Sized>(mut eligible: Vec<Profile>, rng: &mut R) -> Option<Profile> {
    if eligible.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..eligible.len());
    Some(eligible.swap_remove(index))
}

/// Picks the next profile to show a user
#[derive(Clone)]
pub struct CandidateSelector {
    store: Arc<dyn Store>,
}

impl CandidateSelector {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// One random eligible profile, or `None` when the user has seen everyone.
    ///
    /// Pure read. The store reads committed data, so a profile the
    /// requester just rated is never offered again.
    pub async fn select_candidate(&self, requester: UserId) -> Result<Option<Profile>, CoreError> {
        let eligible = self.store.eligible_candidates(requester).await?;
        tracing::debug!("Selecting among {} candidates for user {}", eligible.len(), requester);

        Ok(choose_uniform(eligible, &mut rand::thread_rng()))
    }
}
