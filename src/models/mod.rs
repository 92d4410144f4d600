// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ContactRef, Gender, Interest, MatchEntry, MatchOutcome, NewProfile, Profile, User, UserId};
pub use requests::{InboundEventRequest, InboundPayload, RecordInterestRequest};
pub use responses::{CandidateResponse, ErrorResponse, EventResponse, HealthResponse, MatchesResponse};
