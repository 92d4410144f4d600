// Core exports
pub mod engine;
pub mod error;
pub mod matchmaker;
pub mod onboarding;
pub mod selector;
pub mod sessions;
pub mod validation;

pub use engine::{outcome_for, MatchEngine, Matches};
pub use error::CoreError;
pub use matchmaker::{Matchmaker, Submission};
pub use onboarding::{Flow, OnboardingInput, Session, Step, Transition};
pub use selector::{choose_uniform, is_eligible, CandidateSelector};
pub use sessions::SessionStore;
pub use validation::FieldError;
