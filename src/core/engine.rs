use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::CoreError;
use crate::models::{MatchEntry, MatchOutcome, UserId};
use crate::services::{RecordedInterest, Store};

/// Turn a recorded rating into the outcome shown to the rater
pub fn outcome_for(recorded: &RecordedInterest) -> MatchOutcome {
    if !recorded.interest.liked {
        return MatchOutcome::NoMatch;
    }
    if recorded.reciprocated {
        MatchOutcome::Match {
            user_id: recorded.target_owner.user_id,
            contact: recorded.target_owner.contact(),
        }
    } else {
        MatchOutcome::LikeRecorded
    }
}

/// Records ratings and derives matches from the interest ledger.
///
/// Matches are never stored: every call recomputes them from current
/// ratings, so a later `record_interest` for an already-matched pair
/// reports the match again.
#[derive(Clone)]
pub struct MatchEngine {
    store: Arc<dyn Store>,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Upsert the rating and report whether it completed a mutual like
    pub async fn record_interest(
        &self,
        rater: UserId,
        target_profile: Uuid,
        liked: bool,
    ) -> Result<MatchOutcome, CoreError> {
        let target = self
            .store
            .get_profile(target_profile)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("profile {}", target_profile)))?;
        if target.user_id == rater {
            return Err(CoreError::Conflict("cannot rate your own profile".to_string()));
        }

        let recorded = self.store.record_interest(rater, target_profile, liked).await?;
        let outcome = outcome_for(&recorded);

        if outcome.is_match() {
            tracing::info!("Match between users {} and {}", rater, recorded.target_owner.user_id);
        } else {
            tracing::debug!("User {} rated profile {} (liked: {})", rater, target_profile, liked);
        }

        Ok(outcome)
    }

    /// Everyone mutually liked with `user`, freshly computed
    pub async fn list_matches(&self, user: UserId) -> Result<Matches, CoreError> {
        let entries = self.store.list_matches(user).await?;
        Ok(Matches {
            inner: entries.into_iter(),
        })
    }
}

/// Single-pass sequence of matches from one `list_matches` call
#[derive(Debug)]
pub struct Matches {
    inner: std::vec::IntoIter<MatchEntry>,
}

impl Iterator for Matches {
    type Item = MatchEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Matches {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactRef, Interest, User};
    use chrono::Utc;

    fn recorded(liked: bool, reciprocated: bool, handle: Option<&str>) -> RecordedInterest {
        RecordedInterest {
            interest: Interest {
                rater_id: 1,
                target_profile_id: Uuid::new_v4(),
                liked,
                created_at: Utc::now(),
            },
            target_owner: User {
                user_id: 2,
                handle: handle.map(str::to_string),
                display_name: "Two".to_string(),
            },
            reciprocated,
        }
    }

    #[test]
    fn test_dislike_is_no_match() {
        assert_eq!(outcome_for(&recorded(false, false, None)), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_unreciprocated_like() {
        assert_eq!(outcome_for(&recorded(true, false, None)), MatchOutcome::LikeRecorded);
    }

    #[test]
    fn test_reciprocated_like_carries_contact() {
        assert_eq!(
            outcome_for(&recorded(true, true, Some("two"))),
            MatchOutcome::Match {
                user_id: 2,
                contact: ContactRef::Handle("two".to_string()),
            }
        );
        assert_eq!(
            outcome_for(&recorded(true, true, None)),
            MatchOutcome::Match {
                user_id: 2,
                contact: ContactRef::UserId(2),
            }
        );
    }
}
