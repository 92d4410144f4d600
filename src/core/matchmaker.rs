use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::OnboardingSettings;
use crate::core::engine::{MatchEngine, Matches};
use crate::core::error::CoreError;
use crate::core::onboarding::{Flow, OnboardingInput, Session, Step, Transition};
use crate::core::selector::CandidateSelector;
use crate::core::sessions::SessionStore;
use crate::models::{MatchOutcome, Profile, User, UserId};
use crate::services::{Store, StoreError};

/// Result of feeding one input to an open onboarding session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// No session, or the input did not fit the current step
    Ignored,
    Advanced(Step),
    Committed(Profile),
}

/// Entry point for everything the transport can ask of the core
#[derive(Clone)]
pub struct Matchmaker {
    store: Arc<dyn Store>,
    sessions: SessionStore,
    flow: Flow,
    selector: CandidateSelector,
    engine: MatchEngine,
}

impl Matchmaker {
    pub fn new(store: Arc<dyn Store>, settings: &OnboardingSettings) -> Self {
        Self::with_parts(
            store,
            SessionStore::new(Duration::from_secs(settings.session_idle_secs)),
            Flow::from_settings(settings),
        )
    }

    pub fn with_parts(store: Arc<dyn Store>, sessions: SessionStore, flow: Flow) -> Self {
        Self {
            selector: CandidateSelector::new(store.clone()),
            engine: MatchEngine::new(store.clone()),
            store,
            sessions,
            flow,
        }
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Record first contact, or refresh handle and display name
    pub async fn upsert_user(&self, user: &User) -> Result<User, CoreError> {
        Ok(self.store.upsert_user(user).await?)
    }

    /// Open (or restart) onboarding for a user without an active profile.
    ///
    /// A second start while a session is open discards the partial input
    /// and begins again at the first step.
    pub async fn start_onboarding(&self, user_id: UserId) -> Result<Step, CoreError> {
        let mut slot = self.sessions.lock(user_id).await;

        if let Some(existing) = self.store.active_profile(user_id).await? {
            tracing::debug!("User {} already has active profile {}", user_id, existing.id);
            return Err(CoreError::Conflict("profile already exists".to_string()));
        }

        if let Some(previous) = slot.as_ref() {
            tracing::debug!(
                "Restarting onboarding for user {} (was at {}, started {})",
                user_id,
                previous.step(),
                previous.started_at()
            );
        }

        let session = Session::new(user_id, &self.flow);
        let step = session.step();
        *slot = Some(session);

        tracing::info!("Onboarding started for user {}", user_id);
        Ok(step)
    }

    /// Drop an open session. Returns false when there was none.
    pub async fn abandon_onboarding(&self, user_id: UserId) -> bool {
        let Some(mut slot) = self.sessions.lock_existing(user_id).await else {
            return false;
        };
        let had_session = slot.take().is_some();
        if had_session {
            tracing::info!("Onboarding abandoned by user {}", user_id);
        }
        had_session
    }

    pub async fn onboarding_step(&self, user_id: UserId) -> Option<Step> {
        self.sessions.step_of(user_id).await
    }

    /// Apply one input to the user's session, committing the profile once
    /// the last step validates.
    ///
    /// A failed commit keeps the session at its last step so the user can
    /// retry; nothing is written on failure.
    pub async fn submit(&self, user: &User, input: OnboardingInput) -> Result<Submission, CoreError> {
        let Some(mut slot) = self.sessions.lock_existing(user.user_id).await else {
            return Ok(Submission::Ignored);
        };
        let Some(session) = slot.as_mut() else {
            return Ok(Submission::Ignored);
        };

        let draft = match session.apply(input, &self.flow, &user.display_name) {
            Transition::Ignored => return Ok(Submission::Ignored),
            Transition::Rejected(source) => {
                return Err(CoreError::Validation {
                    step: session.step(),
                    source,
                })
            }
            Transition::Advanced(step) => return Ok(Submission::Advanced(step)),
            Transition::Complete(draft) => draft,
        };

        match self.store.create_profile(draft).await {
            Ok(profile) => {
                *slot = None;
                tracing::info!("Profile {} committed for user {}", profile.id, profile.user_id);
                Ok(Submission::Committed(profile))
            }
            Err(StoreError::Conflict(msg)) => {
                *slot = None;
                tracing::warn!("Onboarding for user {} hit an existing profile: {}", user.user_id, msg);
                Err(CoreError::Conflict(msg))
            }
            Err(e) => {
                tracing::error!("Failed to commit profile for user {}: {}", user.user_id, e);
                Err(e.into())
            }
        }
    }

    pub async fn get_active_profile(&self, user_id: UserId) -> Result<Option<Profile>, CoreError> {
        Ok(self.store.active_profile(user_id).await?)
    }

    /// Soft-delete the user's active profile; ratings and matches survive
    pub async fn deactivate_profile(&self, user_id: UserId) -> Result<Profile, CoreError> {
        let profile = self
            .store
            .deactivate_profile(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("no active profile for user {}", user_id)))?;

        tracing::info!("Profile {} deactivated by user {}", profile.id, user_id);
        Ok(profile)
    }

    pub async fn select_candidate(&self, user_id: UserId) -> Result<Option<Profile>, CoreError> {
        self.selector.select_candidate(user_id).await
    }

    pub async fn record_interest(
        &self,
        rater: UserId,
        target_profile: Uuid,
        liked: bool,
    ) -> Result<MatchOutcome, CoreError> {
        self.engine.record_interest(rater, target_profile, liked).await
    }

    pub async fn list_matches(&self, user_id: UserId) -> Result<Matches, CoreError> {
        self.engine.list_matches(user_id).await
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await.unwrap_or(false)
    }
}
