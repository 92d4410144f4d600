use uuid::Uuid;

use crate::core::OnboardingInput;
use crate::models::{Gender, InboundEventRequest, InboundPayload, User};

/// Choice keys attached to buttons and decoded back here
pub mod keys {
    use crate::models::Gender;
    use uuid::Uuid;

    pub const MENU_CREATE: &str = "menu:create";
    pub const MENU_PROFILE: &str = "menu:profile";
    pub const MENU_BROWSE: &str = "menu:browse";
    pub const MENU_MATCHES: &str = "menu:matches";
    pub const MENU_DELETE: &str = "menu:delete";
    pub const MENU_CANCEL: &str = "menu:cancel";
    pub const DELETE_CONFIRM: &str = "delete:confirm";

    pub fn gender(gender: Gender) -> String {
        format!("gender:{}", gender.as_str())
    }

    pub fn faculty(index: usize) -> String {
        format!("faculty:{}", index)
    }

    pub fn rate(profile_id: Uuid, liked: bool) -> String {
        let verdict = if liked { "like" } else { "dislike" };
        format!("rate:{}:{}", verdict, profile_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    CreateProfile,
    MyProfile,
    DeleteProfile,
    ConfirmDelete,
    Browse,
    Matches,
    Cancel,
}

impl Command {
    fn from_slash(word: &str) -> Option<Self> {
        // "/browse@campus_bot" in group chats
        let word = word.split('@').next().unwrap_or(word);
        match word {
            "/start" => Some(Command::Start),
            "/help" => Some(Command::Help),
            "/create" => Some(Command::CreateProfile),
            "/profile" => Some(Command::MyProfile),
            "/delete" => Some(Command::DeleteProfile),
            "/browse" => Some(Command::Browse),
            "/matches" => Some(Command::Matches),
            "/cancel" => Some(Command::Cancel),
            _ => None,
        }
    }

    fn from_menu_key(key: &str) -> Option<Self> {
        match key {
            keys::MENU_CREATE => Some(Command::CreateProfile),
            keys::MENU_PROFILE => Some(Command::MyProfile),
            keys::MENU_BROWSE => Some(Command::Browse),
            keys::MENU_MATCHES => Some(Command::Matches),
            keys::MENU_DELETE => Some(Command::DeleteProfile),
            keys::MENU_CANCEL => Some(Command::Cancel),
            keys::DELETE_CONFIRM => Some(Command::ConfirmDelete),
            _ => None,
        }
    }
}

/// What an inbound event asks for, decoded once at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Command(Command),
    Rate { profile_id: Uuid, liked: bool },
    Onboarding(OnboardingInput),
    Unknown,
}

/// An event from the chat transport, attributed to a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    TextInput { user: User, text: String },
    MediaInput { user: User, media_ref: String },
    ChoiceInput { user: User, choice_key: String },
}

impl InboundEvent {
    pub fn user(&self) -> &User {
        match self {
            InboundEvent::TextInput { user, .. }
            | InboundEvent::MediaInput { user, .. }
            | InboundEvent::ChoiceInput { user, .. } => user,
        }
    }

    pub fn decode(&self) -> Intent {
        match self {
            InboundEvent::TextInput { text, .. } => decode_text(text),
            InboundEvent::MediaInput { media_ref, .. } => {
                Intent::Onboarding(OnboardingInput::Photo(media_ref.clone()))
            }
            InboundEvent::ChoiceInput { choice_key, .. } => decode_choice(choice_key),
        }
    }
}

impl From<InboundEventRequest> for InboundEvent {
    fn from(req: InboundEventRequest) -> Self {
        let user = User {
            user_id: req.user_id,
            handle: req.username,
            display_name: req.display_name,
        };
        match req.event {
            InboundPayload::Text { text } => InboundEvent::TextInput { user, text },
            InboundPayload::Media { media_ref } => InboundEvent::MediaInput { user, media_ref },
            InboundPayload::Choice { key } => InboundEvent::ChoiceInput {
                user,
                choice_key: key,
            },
        }
    }
}

fn decode_text(text: &str) -> Intent {
    let trimmed = text.trim();
    if trimmed.starts_with('/') {
        let word = trimmed.split_whitespace().next().unwrap_or(trimmed);
        // Unknown slash words fall through as plain text ("/me loves cats")
        if let Some(command) = Command::from_slash(word) {
            return Intent::Command(command);
        }
    }
    Intent::Onboarding(OnboardingInput::Text(text.to_string()))
}

fn decode_choice(key: &str) -> Intent {
    if let Some(command) = Command::from_menu_key(key) {
        return Intent::Command(command);
    }

    let mut parts = key.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("gender"), Some(value), None) => {
            Intent::Onboarding(OnboardingInput::Gender(value.to_string()))
        }
        (Some("faculty"), Some(index), None) => match index.parse() {
            Ok(index) => Intent::Onboarding(OnboardingInput::Faculty(index)),
            Err(_) => Intent::Unknown,
        },
        (Some("rate"), Some(verdict), Some(profile_id)) => {
            let liked = match verdict {
                "like" => true,
                "dislike" => false,
                _ => return Intent::Unknown,
            };
            match Uuid::parse_str(profile_id) {
                Ok(profile_id) => Intent::Rate { profile_id, liked },
                Err(_) => Intent::Unknown,
            }
        }
        _ => Intent::Unknown,
    }
}

/// Gender options offered during onboarding
pub fn gender_keys() -> impl Iterator<Item = (Gender, String)> {
    Gender::ALL.into_iter().map(|g| (g, keys::gender(g)))
}
