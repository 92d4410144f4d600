use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::OnboardingSettings;
use crate::core::validation::{
    validate_age, validate_bio, validate_faculty, validate_gender, validate_name, validate_photo,
    FieldError,
};
use crate::models::{Gender, NewProfile, UserId};

/// Onboarding steps, walked strictly in this order. Name and faculty are
/// skipped when a deployment does not collect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AwaitingName,
    AwaitingPhoto,
    AwaitingGender,
    AwaitingAge,
    AwaitingFaculty,
    AwaitingBio,
}

impl Step {
    const ORDER: [Step; 6] = [
        Step::AwaitingName,
        Step::AwaitingPhoto,
        Step::AwaitingGender,
        Step::AwaitingAge,
        Step::AwaitingFaculty,
        Step::AwaitingBio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::AwaitingName => "awaiting_name",
            Step::AwaitingPhoto => "awaiting_photo",
            Step::AwaitingGender => "awaiting_gender",
            Step::AwaitingAge => "awaiting_age",
            Step::AwaitingFaculty => "awaiting_faculty",
            Step::AwaitingBio => "awaiting_bio",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The step sequence a deployment runs
#[derive(Debug, Clone)]
pub struct Flow {
    collect_name: bool,
    collect_faculty: bool,
    faculties: Vec<String>,
}

impl Flow {
    pub fn new(collect_name: bool, collect_faculty: bool, faculties: Vec<String>) -> Self {
        Self {
            collect_name,
            collect_faculty,
            faculties,
        }
    }

    pub fn from_settings(settings: &OnboardingSettings) -> Self {
        Self::new(
            settings.collect_name,
            settings.collect_faculty,
            settings.faculties.clone(),
        )
    }

    pub fn includes(&self, step: Step) -> bool {
        match step {
            Step::AwaitingName => self.collect_name,
            Step::AwaitingFaculty => self.collect_faculty,
            _ => true,
        }
    }

    pub fn first(&self) -> Step {
        Step::ORDER
            .into_iter()
            .find(|s| self.includes(*s))
            .unwrap_or(Step::AwaitingPhoto)
    }

    /// Step after `step`, or `None` once bio is reached
    pub fn next(&self, step: Step) -> Option<Step> {
        Step::ORDER
            .into_iter()
            .skip_while(|s| *s != step)
            .skip(1)
            .find(|s| self.includes(*s))
    }

    pub fn faculties(&self) -> &[String] {
        &self.faculties
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::from_settings(&OnboardingSettings::default())
    }
}

/// One decoded input, typed by the shape it arrived in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingInput {
    Text(String),
    Photo(String),
    Gender(String),
    Faculty(usize),
}

/// What a single input did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Wrong shape or wrong step: nothing recorded
    Ignored,
    /// Right shape, failed validation: same step, nothing recorded
    Rejected(FieldError),
    Advanced(Step),
    /// Every field is collected; the profile is ready to commit
    Complete(NewProfile),
}

/// Per-user onboarding progress. Lives only in process memory.
#[derive(Debug, Clone)]
pub struct Session {
    user_id: UserId,
    step: Step,
    name: Option<String>,
    photo_ref: Option<String>,
    gender: Option<Gender>,
    age: Option<u8>,
    faculty: Option<String>,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId, flow: &Flow) -> Self {
        Self {
            user_id,
            step: flow.first(),
            name: None,
            photo_ref: None,
            gender: None,
            age: None,
            faculty: None,
            started_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Feed one input to the current step.
    ///
    /// `fallback_name` becomes the profile's display name when the flow
    /// does not collect one. On [`Transition::Complete`] the session stays
    /// at the bio step so a failed commit can be retried by resending it.
    pub fn apply(&mut self, input: OnboardingInput, flow: &Flow, fallback_name: &str) -> Transition {
        let recorded = match (self.step, input) {
            (Step::AwaitingName, OnboardingInput::Text(text)) => {
                validate_name(&text).map(|name| self.name = Some(name))
            }
            (Step::AwaitingPhoto, OnboardingInput::Photo(media_ref)) => {
                validate_photo(&media_ref).map(|photo| self.photo_ref = Some(photo))
            }
            (Step::AwaitingGender, OnboardingInput::Gender(key)) => {
                validate_gender(&key).map(|gender| self.gender = Some(gender))
            }
            (Step::AwaitingAge, OnboardingInput::Text(text)) => {
                validate_age(&text).map(|age| self.age = Some(age))
            }
            (Step::AwaitingFaculty, OnboardingInput::Faculty(index)) => {
                validate_faculty(index, flow.faculties()).map(|faculty| self.faculty = Some(faculty))
            }
            (Step::AwaitingBio, OnboardingInput::Text(text)) => {
                return match validate_bio(&text) {
                    Ok(bio) => match self.draft(bio, fallback_name) {
                        Some(profile) => Transition::Complete(profile),
                        None => Transition::Ignored,
                    },
                    Err(e) => Transition::Rejected(e),
                };
            }
            _ => return Transition::Ignored,
        };

        match recorded {
            Ok(()) => match flow.next(self.step) {
                Some(next) => {
                    self.step = next;
                    Transition::Advanced(next)
                }
                None => Transition::Ignored,
            },
            Err(e) => Transition::Rejected(e),
        }
    }

    fn draft(&self, bio: String, fallback_name: &str) -> Option<NewProfile> {
        let display_name = match &self.name {
            Some(name) => name.clone(),
            None if !fallback_name.trim().is_empty() => fallback_name.trim().to_string(),
            None => format!("User {}", self.user_id),
        };

        Some(NewProfile {
            user_id: self.user_id,
            display_name,
            photo_ref: self.photo_ref.clone()?,
            gender: self.gender?,
            faculty: self.faculty.clone(),
            age: self.age?,
            bio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_flow() -> Flow {
        Flow::new(true, true, vec!["Law".to_string(), "Arts".to_string()])
    }

    fn text(s: &str) -> OnboardingInput {
        OnboardingInput::Text(s.to_string())
    }

    #[test]
    fn test_flow_order_full() {
        let flow = full_flow();
        assert_eq!(flow.first(), Step::AwaitingName);
        assert_eq!(flow.next(Step::AwaitingName), Some(Step::AwaitingPhoto));
        assert_eq!(flow.next(Step::AwaitingAge), Some(Step::AwaitingFaculty));
        assert_eq!(flow.next(Step::AwaitingBio), None);
    }

    #[test]
    fn test_flow_skips_optional_steps() {
        let flow = Flow::new(false, false, vec![]);
        assert_eq!(flow.first(), Step::AwaitingPhoto);
        assert_eq!(flow.next(Step::AwaitingAge), Some(Step::AwaitingBio));
    }

    #[test]
    fn test_full_walk_produces_profile() {
        let flow = full_flow();
        let mut session = Session::new(7, &flow);

        assert_eq!(session.apply(text("Ann"), &flow, ""), Transition::Advanced(Step::AwaitingPhoto));
        assert_eq!(
            session.apply(OnboardingInput::Photo("file-1".into()), &flow, ""),
            Transition::Advanced(Step::AwaitingGender)
        );
        assert_eq!(
            session.apply(OnboardingInput::Gender("female".into()), &flow, ""),
            Transition::Advanced(Step::AwaitingAge)
        );
        assert_eq!(session.apply(text("20"), &flow, ""), Transition::Advanced(Step::AwaitingFaculty));
        assert_eq!(
            session.apply(OnboardingInput::Faculty(1), &flow, ""),
            Transition::Advanced(Step::AwaitingBio)
        );

        match session.apply(text("hi"), &flow, "") {
            Transition::Complete(profile) => {
                assert_eq!(profile.user_id, 7);
                assert_eq!(profile.display_name, "Ann");
                assert_eq!(profile.photo_ref, "file-1");
                assert_eq!(profile.gender, Gender::Female);
                assert_eq!(profile.age, 20);
                assert_eq!(profile.faculty.as_deref(), Some("Arts"));
                assert_eq!(profile.bio, "hi");
            }
            other => panic!("expected Complete, got {:?}", other),
        }
        // stays on bio so a failed commit can be retried
        assert_eq!(session.step(), Step::AwaitingBio);
    }

    #[test]
    fn test_wrong_shape_is_ignored() {
        let flow = full_flow();
        let mut session = Session::new(7, &flow);

        assert_eq!(session.apply(OnboardingInput::Photo("file".into()), &flow, ""), Transition::Ignored);
        assert_eq!(session.apply(OnboardingInput::Gender("male".into()), &flow, ""), Transition::Ignored);
        assert_eq!(session.step(), Step::AwaitingName);

        session.apply(text("Ann"), &flow, "");
        // text while a photo is expected
        assert_eq!(session.apply(text("here it is"), &flow, ""), Transition::Ignored);
        assert_eq!(session.step(), Step::AwaitingPhoto);
    }

    #[test]
    fn test_invalid_age_keeps_step() {
        let flow = Flow::new(false, false, vec![]);
        let mut session = Session::new(7, &flow);
        session.apply(OnboardingInput::Photo("file".into()), &flow, "");
        session.apply(OnboardingInput::Gender("male".into()), &flow, "");

        assert_eq!(
            session.apply(text("25 years"), &flow, ""),
            Transition::Rejected(FieldError::AgeNotNumber)
        );
        assert_eq!(session.step(), Step::AwaitingAge);
        assert!(session.age.is_none());

        assert_eq!(session.apply(text("25"), &flow, ""), Transition::Advanced(Step::AwaitingBio));
    }

    #[test]
    fn test_unknown_choice_rejected() {
        let flow = full_flow();
        let mut session = Session::new(7, &flow);
        session.apply(text("Ann"), &flow, "");
        session.apply(OnboardingInput::Photo("file".into()), &flow, "");

        assert!(matches!(
            session.apply(OnboardingInput::Gender("robot".into()), &flow, ""),
            Transition::Rejected(FieldError::UnknownGender(_))
        ));
        assert_eq!(session.step(), Step::AwaitingGender);
    }

    #[test]
    fn test_fallback_display_name() {
        let flow = Flow::new(false, false, vec![]);
        let mut session = Session::new(7, &flow);
        session.apply(OnboardingInput::Photo("file".into()), &flow, "Telegram Ann");
        session.apply(OnboardingInput::Gender("female".into()), &flow, "Telegram Ann");
        session.apply(text("30"), &flow, "Telegram Ann");

        match session.apply(text(""), &flow, "Telegram Ann") {
            Transition::Complete(profile) => {
                assert_eq!(profile.display_name, "Telegram Ann");
                assert!(profile.faculty.is_none());
            }
            other => panic!("expected Complete, got {:?}", other),
        }
    }
}
