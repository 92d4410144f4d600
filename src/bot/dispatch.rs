use uuid::Uuid;

use crate::bot::intent::{Command, InboundEvent, Intent};
use crate::bot::render::{self, Renderer};
use crate::core::{CoreError, Matchmaker, OnboardingInput, Submission};
use crate::models::{MatchEntry, MatchOutcome, User};

/// Routes decoded intents to the core and renders the results
#[derive(Clone)]
pub struct Dispatcher {
    matchmaker: Matchmaker,
}

impl Dispatcher {
    pub fn new(matchmaker: Matchmaker) -> Self {
        Self { matchmaker }
    }

    pub fn matchmaker(&self) -> &Matchmaker {
        &self.matchmaker
    }

    /// Handle one inbound event. Never fails: every outcome, storage
    /// failures included, is rendered to the user or dropped.
    pub async fn handle(&self, event: InboundEvent, out: &dyn Renderer) {
        let user = match self.matchmaker.upsert_user(event.user()).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("Failed to upsert user {}: {}", event.user().user_id, e);
                out.render(render::failure(event.user().user_id));
                return;
            }
        };

        match event.decode() {
            Intent::Command(command) => self.on_command(&user, command, out).await,
            Intent::Rate { profile_id, liked } => self.on_rate(&user, profile_id, liked, out).await,
            Intent::Onboarding(input) => self.on_input(&user, input, out).await,
            Intent::Unknown => {
                tracing::debug!("Dropping undecodable event from user {}", user.user_id);
            }
        }
    }

    async fn on_command(&self, user: &User, command: Command, out: &dyn Renderer) {
        let user_id = user.user_id;
        tracing::debug!("User {} sent {:?}", user_id, command);

        let result = match command {
            Command::Start | Command::Help => {
                out.render(render::welcome(user));
                Ok(())
            }
            Command::CreateProfile => self.start_onboarding(user, out).await,
            Command::Cancel => {
                if self.matchmaker.abandon_onboarding(user_id).await {
                    out.render(render::onboarding_cancelled(user_id));
                } else {
                    out.render(render::nothing_to_cancel(user_id));
                }
                Ok(())
            }
            Command::MyProfile => self.show_own_profile(user, out).await,
            Command::DeleteProfile => match self.matchmaker.get_active_profile(user_id).await {
                Ok(Some(_)) => {
                    out.render(render::confirm_delete(user_id));
                    Ok(())
                }
                Ok(None) => {
                    out.render(render::no_profile(user_id));
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Command::ConfirmDelete => match self.matchmaker.deactivate_profile(user_id).await {
                Ok(_) => {
                    out.render(render::profile_deleted(user_id));
                    Ok(())
                }
                Err(CoreError::NotFound(_)) => {
                    out.render(render::no_profile(user_id));
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Command::Browse => self.show_next_candidate(user, out).await,
            Command::Matches => self.show_matches(user, out).await,
        };

        if let Err(e) = result {
            self.render_error(user, e, out);
        }
    }

    async fn start_onboarding(&self, user: &User, out: &dyn Renderer) -> Result<(), CoreError> {
        match self.matchmaker.start_onboarding(user.user_id).await {
            Ok(step) => {
                out.render(render::prompt(user.user_id, step, self.matchmaker.flow()));
                Ok(())
            }
            Err(CoreError::Conflict(_)) => {
                out.render(render::profile_exists(user.user_id));
                self.show_own_profile(user, out).await
            }
            Err(e) => Err(e),
        }
    }

    async fn on_input(&self, user: &User, input: OnboardingInput, out: &dyn Renderer) {
        let user_id = user.user_id;

        match self.matchmaker.submit(user, input).await {
            Ok(Submission::Ignored) => {
                // Re-prompt only when a session is open; stray input is dropped
                if let Some(step) = self.matchmaker.onboarding_step(user_id).await {
                    out.render(render::prompt(user_id, step, self.matchmaker.flow()));
                } else {
                    tracing::debug!("Dropping stray input from user {}", user_id);
                }
            }
            Ok(Submission::Advanced(step)) => {
                out.render(render::prompt(user_id, step, self.matchmaker.flow()));
            }
            Ok(Submission::Committed(profile)) => {
                out.render(render::profile_created(user_id));
                out.render(render::own_profile(user_id, &profile));
            }
            Err(CoreError::Validation { step, source }) => {
                out.render(render::rejected(user_id, &source));
                out.render(render::prompt(user_id, step, self.matchmaker.flow()));
            }
            Err(CoreError::Conflict(_)) => {
                out.render(render::profile_exists(user_id));
                if let Err(e) = self.show_own_profile(user, out).await {
                    self.render_error(user, e, out);
                }
            }
            Err(e) => self.render_error(user, e, out),
        }
    }

    async fn on_rate(&self, user: &User, profile_id: Uuid, liked: bool, out: &dyn Renderer) {
        let user_id = user.user_id;

        match self.matchmaker.get_active_profile(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                out.render(render::no_profile(user_id));
                return;
            }
            Err(e) => {
                self.render_error(user, e, out);
                return;
            }
        }

        match self.matchmaker.record_interest(user_id, profile_id, liked).await {
            Ok(MatchOutcome::NoMatch) => {}
            Ok(MatchOutcome::LikeRecorded) => out.render(render::like_sent(user_id)),
            Ok(MatchOutcome::Match { user_id: other_id, contact }) => {
                let other_name = match self.matchmaker.get_active_profile(other_id).await {
                    Ok(Some(profile)) => profile.display_name,
                    _ => "someone".to_string(),
                };
                let own_name = match self.matchmaker.get_active_profile(user_id).await {
                    Ok(Some(profile)) => profile.display_name,
                    _ => user.display_name.clone(),
                };
                out.render(render::matched(user_id, &other_name, &contact));
                out.render(render::matched(other_id, &own_name, &user.contact()));
            }
            Err(CoreError::NotFound(_)) => out.render(render::profile_gone(user_id)),
            Err(CoreError::Conflict(msg)) => {
                tracing::warn!("Rejected rating from user {}: {}", user_id, msg);
            }
            Err(e) => {
                self.render_error(user, e, out);
                return;
            }
        }

        if let Err(e) = self.show_next_candidate(user, out).await {
            self.render_error(user, e, out);
        }
    }

    async fn show_own_profile(&self, user: &User, out: &dyn Renderer) -> Result<(), CoreError> {
        match self.matchmaker.get_active_profile(user.user_id).await? {
            Some(profile) => out.render(render::own_profile(user.user_id, &profile)),
            None => out.render(render::no_profile(user.user_id)),
        }
        Ok(())
    }

    async fn show_next_candidate(&self, user: &User, out: &dyn Renderer) -> Result<(), CoreError> {
        if self.matchmaker.get_active_profile(user.user_id).await?.is_none() {
            out.render(render::no_profile(user.user_id));
            return Ok(());
        }

        match self.matchmaker.select_candidate(user.user_id).await? {
            Some(profile) => out.render(render::candidate(user.user_id, &profile)),
            None => out.render(render::exhausted(user.user_id)),
        }
        Ok(())
    }

    async fn show_matches(&self, user: &User, out: &dyn Renderer) -> Result<(), CoreError> {
        let entries: Vec<MatchEntry> = self.matchmaker.list_matches(user.user_id).await?.collect();
        out.render(render::matches(user.user_id, &entries));
        Ok(())
    }

    fn render_error(&self, user: &User, error: CoreError, out: &dyn Renderer) {
        match error {
            CoreError::NotFound(msg) => {
                tracing::debug!("Nothing to show for user {}: {}", user.user_id, msg);
            }
            CoreError::Validation { step, source } => {
                out.render(render::rejected(user.user_id, &source));
                out.render(render::prompt(user.user_id, step, self.matchmaker.flow()));
            }
            CoreError::Conflict(msg) => {
                tracing::warn!("Conflict for user {}: {}", user.user_id, msg);
                out.render(render::profile_exists(user.user_id));
            }
            CoreError::Storage(msg) => {
                tracing::error!("Storage failure for user {}: {}", user.user_id, msg);
                out.render(render::failure(user.user_id));
            }
        }
    }
}
