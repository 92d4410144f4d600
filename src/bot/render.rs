use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::bot::intent::{gender_keys, keys};
use crate::core::{FieldError, Flow, Step};
use crate::models::{ContactRef, MatchEntry, Profile, User, UserId};

/// A selectable option attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub key: String,
    pub label: String,
}

impl Choice {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// One outbound message for the transport to deliver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub text: String,
    #[serde(rename = "photoRef", default, skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Reply {
    pub fn text(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            text: text.into(),
            photo_ref: None,
            choices: Vec::new(),
        }
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_photo(mut self, photo_ref: impl Into<String>) -> Self {
        self.photo_ref = Some(photo_ref.into());
        self
    }
}

/// Outbound side of the chat transport. Must not block.
pub trait Renderer: Send + Sync {
    fn render(&self, reply: Reply);
}

/// Collects replies so a request/response transport can return them
#[derive(Debug, Default)]
pub struct ReplyBuffer {
    replies: Mutex<Vec<Reply>>,
}

impl ReplyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_replies(self) -> Vec<Reply> {
        self.replies.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Renderer for ReplyBuffer {
    fn render(&self, reply: Reply) {
        match self.replies.lock() {
            Ok(mut replies) => replies.push(reply),
            Err(poisoned) => poisoned.into_inner().push(reply),
        }
    }
}

pub fn main_menu() -> Vec<Choice> {
    vec![
        Choice::new(keys::MENU_CREATE, "Create profile"),
        Choice::new(keys::MENU_PROFILE, "My profile"),
        Choice::new(keys::MENU_BROWSE, "Browse"),
        Choice::new(keys::MENU_MATCHES, "My matches"),
        Choice::new(keys::MENU_DELETE, "Delete profile"),
    ]
}

pub fn welcome(user: &User) -> Reply {
    let name = if user.display_name.trim().is_empty() {
        "there"
    } else {
        user.display_name.trim()
    };
    Reply::text(
        user.user_id,
        format!(
            "Hi, {}! Build a profile, then browse others and like the ones you fancy. \
             When the like is mutual you'll get each other's contact.",
            name
        ),
    )
    .with_choices(main_menu())
}

/// Prompt for the field a step collects
pub fn prompt(user_id: UserId, step: Step, flow: &Flow) -> Reply {
    let cancel = Choice::new(keys::MENU_CANCEL, "Cancel");
    match step {
        Step::AwaitingName => Reply::text(user_id, "What's your name? (2-50 characters)")
            .with_choices(vec![cancel]),
        Step::AwaitingPhoto => Reply::text(user_id, "Send a photo for your profile.")
            .with_choices(vec![cancel]),
        Step::AwaitingGender => {
            let mut choices: Vec<Choice> = gender_keys()
                .map(|(gender, key)| Choice::new(key, capitalize(gender.as_str())))
                .collect();
            choices.push(cancel);
            Reply::text(user_id, "Choose your gender.").with_choices(choices)
        }
        Step::AwaitingAge => Reply::text(user_id, "How old are you? Send a number from 16 to 100.")
            .with_choices(vec![cancel]),
        Step::AwaitingFaculty => {
            let mut choices: Vec<Choice> = flow
                .faculties()
                .iter()
                .enumerate()
                .map(|(i, label)| Choice::new(keys::faculty(i), label.clone()))
                .collect();
            choices.push(cancel);
            Reply::text(user_id, "Which faculty are you in?").with_choices(choices)
        }
        Step::AwaitingBio => Reply::text(user_id, "Tell others about yourself (up to 500 characters).")
            .with_choices(vec![cancel]),
    }
}

pub fn rejected(user_id: UserId, error: &FieldError) -> Reply {
    let text = match error {
        FieldError::NameLength => "That name doesn't fit: use 2 to 50 characters.".to_string(),
        FieldError::AgeNotNumber => "Please send your age as a number, e.g. 20.".to_string(),
        FieldError::AgeOutOfRange => "Age must be between 16 and 100.".to_string(),
        FieldError::BioTooLong => "That's too long: keep it to 500 characters.".to_string(),
        other => format!("That didn't work: {}.", other),
    };
    Reply::text(user_id, text)
}

fn profile_caption(profile: &Profile) -> String {
    let mut caption = format!("{}, {}", profile.display_name, profile.age);
    if let Some(faculty) = &profile.faculty {
        caption.push_str(&format!(" · {}", faculty));
    }
    if !profile.bio.is_empty() {
        caption.push_str("\n\n");
        caption.push_str(&profile.bio);
    }
    caption
}

/// The user's own profile
pub fn own_profile(user_id: UserId, profile: &Profile) -> Reply {
    Reply::text(user_id, profile_caption(profile))
        .with_photo(profile.photo_ref.clone())
        .with_choices(main_menu())
}

/// A candidate shown while browsing, with like/dislike options
pub fn candidate(user_id: UserId, profile: &Profile) -> Reply {
    Reply::text(user_id, profile_caption(profile))
        .with_photo(profile.photo_ref.clone())
        .with_choices(vec![
            Choice::new(keys::rate(profile.id, true), "Like"),
            Choice::new(keys::rate(profile.id, false), "Dislike"),
        ])
}

pub fn exhausted(user_id: UserId) -> Reply {
    Reply::text(user_id, "You've seen everyone for now. Check back later!").with_choices(main_menu())
}

pub fn no_profile(user_id: UserId) -> Reply {
    Reply::text(user_id, "You don't have a profile yet.")
        .with_choices(vec![Choice::new(keys::MENU_CREATE, "Create profile")])
}

pub fn profile_exists(user_id: UserId) -> Reply {
    Reply::text(user_id, "You already have a profile. Delete it first to make a new one.")
}

pub fn profile_created(user_id: UserId) -> Reply {
    Reply::text(user_id, "Your profile is live! Here's how others see it:")
}

pub fn confirm_delete(user_id: UserId) -> Reply {
    Reply::text(user_id, "Delete your profile? Your matches will be kept.").with_choices(vec![
        Choice::new(keys::DELETE_CONFIRM, "Yes, delete"),
        Choice::new(keys::MENU_PROFILE, "No, keep it"),
    ])
}

pub fn profile_deleted(user_id: UserId) -> Reply {
    Reply::text(user_id, "Your profile was deleted.").with_choices(main_menu())
}

pub fn onboarding_cancelled(user_id: UserId) -> Reply {
    Reply::text(user_id, "Profile creation cancelled.").with_choices(main_menu())
}

pub fn nothing_to_cancel(user_id: UserId) -> Reply {
    Reply::text(user_id, "There's nothing to cancel.").with_choices(main_menu())
}

pub fn like_sent(user_id: UserId) -> Reply {
    Reply::text(user_id, "Like sent!")
}

pub fn profile_gone(user_id: UserId) -> Reply {
    Reply::text(user_id, "That profile is no longer available.")
}

/// Match notice; `contact` is how to reach the other person
pub fn matched(user_id: UserId, other_name: &str, contact: &ContactRef) -> Reply {
    Reply::text(
        user_id,
        format!("It's a match with {}! Say hi: {}", other_name, contact),
    )
}

pub fn matches(user_id: UserId, entries: &[MatchEntry]) -> Reply {
    if entries.is_empty() {
        return Reply::text(user_id, "No matches yet. Keep browsing!").with_choices(main_menu());
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            format!(
                "• {}, {}: {}",
                entry.profile.display_name,
                entry.profile.age,
                entry.contact()
            )
        })
        .collect();

    Reply::text(user_id, format!("Your matches:\n{}", lines.join("\n"))).with_choices(main_menu())
}

/// Generic failure; the user can simply try again
pub fn failure(user_id: UserId) -> Reply {
    Reply::text(user_id, "Something went wrong on our side. Please try again in a moment.")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_reply_buffer_keeps_order() {
        let buffer = ReplyBuffer::new();
        buffer.render(Reply::text(1, "first"));
        buffer.render(Reply::text(2, "second"));

        let replies = buffer.into_replies();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].text, "first");
        assert_eq!(replies[1].user_id, 2);
    }

    #[test]
    fn test_gender_prompt_offers_every_option() {
        let reply = prompt(1, Step::AwaitingGender, &Flow::default());
        let keys: Vec<&str> = reply.choices.iter().map(|c| c.key.as_str()).collect();
        assert!(keys.contains(&"gender:male"));
        assert!(keys.contains(&"gender:female"));
        assert_eq!(reply.choices[0].label, "Male");
    }

    #[test]
    fn test_candidate_card_carries_profile_id() {
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: 2,
            display_name: "Bob".to_string(),
            photo_ref: "photo-2".to_string(),
            gender: Gender::Male,
            faculty: Some("Law".to_string()),
            age: 23,
            bio: "hello".to_string(),
            is_active: true,
            created_at: Utc::now(),
        };

        let reply = candidate(1, &profile);
        assert_eq!(reply.photo_ref.as_deref(), Some("photo-2"));
        assert!(reply.text.starts_with("Bob, 23 · Law"));
        assert_eq!(reply.choices[0].key, keys::rate(profile.id, true));
    }
}
