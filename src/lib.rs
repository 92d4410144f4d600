//! Campus Match - conversational matchmaking service
//!
//! Users build a profile through a guided chat flow, browse other
//! users' profiles one at a time, and are introduced to each other
//! once both have liked the other.

pub mod bot;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use bot::{Dispatcher, InboundEvent, Renderer, Reply, ReplyBuffer};
pub use core::{CoreError, Matchmaker};
pub use models::{ContactRef, Gender, MatchEntry, MatchOutcome, Profile, User, UserId};
pub use services::{MemoryStore, PostgresStore, Store, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let user = User {
            user_id: 7,
            handle: None,
            display_name: "Ann".to_string(),
        };
        assert_eq!(user.contact(), ContactRef::UserId(7));
    }
}
