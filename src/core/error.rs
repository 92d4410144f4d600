use thiserror::Error;

use crate::core::onboarding::Step;
use crate::core::validation::FieldError;
use crate::services::StoreError;

/// Failure classes surfaced by the matchmaking core
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad onboarding input; the session stays on `step`
    #[error("Invalid input at {step}: {source}")]
    Validation {
        step: Step,
        #[source]
        source: FieldError,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => CoreError::Conflict(msg),
            StoreError::NotFound(msg) => CoreError::NotFound(msg),
            other => CoreError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            CoreError::from(StoreError::Conflict("dup".into())),
            CoreError::Conflict(_)
        ));
        assert!(matches!(
            CoreError::from(StoreError::NotFound("gone".into())),
            CoreError::NotFound(_)
        ));
        assert!(matches!(
            CoreError::from(StoreError::Unavailable("down".into())),
            CoreError::Storage(_)
        ));
    }
}
