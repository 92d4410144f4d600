use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable external account id assigned by the chat platform
pub type UserId = i64;

/// A chat user, created on first contact and refreshed on every later one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl User {
    /// How the other side of a match can reach this user
    pub fn contact(&self) -> ContactRef {
        match self.handle.as_deref().map(str::trim) {
            Some(handle) if !handle.is_empty() => {
                ContactRef::Handle(handle.trim_start_matches('@').to_string())
            }
            _ => ContactRef::UserId(self.user_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == value)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A public listing. At most one per user is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "profileId")]
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "photoRef")]
    pub photo_ref: String,
    pub gender: Gender,
    #[serde(default)]
    pub faculty: Option<String>,
    pub age: u8,
    pub bio: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Fully validated profile fields, ready for a single atomic commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub photo_ref: String,
    pub gender: Gender,
    pub faculty: Option<String>,
    pub age: u8,
    pub bio: String,
}

impl NewProfile {
    pub fn into_profile(self, id: Uuid, created_at: chrono::DateTime<chrono::Utc>) -> Profile {
        Profile {
            id,
            user_id: self.user_id,
            display_name: self.display_name,
            photo_ref: self.photo_ref,
            gender: self.gender,
            faculty: self.faculty,
            age: self.age,
            bio: self.bio,
            is_active: true,
            created_at,
        }
    }
}

/// A directed like/dislike, unique per (rater, target profile)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    #[serde(rename = "raterId")]
    pub rater_id: UserId,
    #[serde(rename = "targetProfileId")]
    pub target_profile_id: Uuid,
    pub liked: bool,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Contact path revealed once a match exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ContactRef {
    Handle(String),
    UserId(UserId),
}

impl fmt::Display for ContactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactRef::Handle(handle) => write!(f, "@{}", handle),
            ContactRef::UserId(id) => write!(f, "tg://user?id={}", id),
        }
    }
}

/// Result of recording one rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MatchOutcome {
    NoMatch,
    LikeRecorded,
    Match {
        #[serde(rename = "userId")]
        user_id: UserId,
        contact: ContactRef,
    },
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Match { .. })
    }
}

/// One mutual match: the other user and a snapshot of their profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub user: User,
    pub profile: Profile,
}

impl MatchEntry {
    pub fn contact(&self) -> ContactRef {
        self.user.contact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_prefers_handle() {
        let user = User {
            user_id: 42,
            handle: Some("@ann".to_string()),
            display_name: "Ann".to_string(),
        };
        assert_eq!(user.contact(), ContactRef::Handle("ann".to_string()));
        assert_eq!(user.contact().to_string(), "@ann");
    }

    #[test]
    fn test_contact_falls_back_to_user_id() {
        let user = User {
            user_id: 42,
            handle: Some("  ".to_string()),
            display_name: "Ann".to_string(),
        };
        assert_eq!(user.contact(), ContactRef::UserId(42));
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("male"), Some(Gender::Male));
        assert_eq!(Gender::parse("female"), Some(Gender::Female));
        assert_eq!(Gender::parse("other"), None);
    }
}
