use thiserror::Error;
use validator::{ValidateLength, ValidateRange};

use crate::models::Gender;

pub const NAME_MIN_CHARS: u64 = 2;
pub const NAME_MAX_CHARS: u64 = 50;
pub const AGE_MIN: i64 = 16;
pub const AGE_MAX: i64 = 100;
pub const BIO_MAX_CHARS: u64 = 500;

/// A single rejected onboarding field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("name must be between 2 and 50 characters")]
    NameLength,

    #[error("age must be a whole number")]
    AgeNotNumber,

    #[error("age must be between 16 and 100")]
    AgeOutOfRange,

    #[error("bio must be at most 500 characters")]
    BioTooLong,

    #[error("photo reference is empty")]
    MissingPhoto,

    #[error("unknown gender option: {0}")]
    UnknownGender(String),

    #[error("unknown faculty option: {0}")]
    UnknownFaculty(usize),
}

/// Trimmed name, 2 to 50 characters
pub fn validate_name(input: &str) -> Result<String, FieldError> {
    let name = input.trim();
    if !name.validate_length(Some(NAME_MIN_CHARS), Some(NAME_MAX_CHARS), None) {
        return Err(FieldError::NameLength);
    }
    Ok(name.to_string())
}

/// Whole number between 16 and 100. Anything else, "25 years" included, is rejected.
pub fn validate_age(input: &str) -> Result<u8, FieldError> {
    let age: i64 = input.trim().parse().map_err(|_| FieldError::AgeNotNumber)?;
    if !age.validate_range(Some(AGE_MIN), Some(AGE_MAX), None, None) {
        return Err(FieldError::AgeOutOfRange);
    }
    u8::try_from(age).map_err(|_| FieldError::AgeOutOfRange)
}

pub fn validate_bio(input: &str) -> Result<String, FieldError> {
    let bio = input.trim();
    if !bio.validate_length(None, Some(BIO_MAX_CHARS), None) {
        return Err(FieldError::BioTooLong);
    }
    Ok(bio.to_string())
}

pub fn validate_photo(media_ref: &str) -> Result<String, FieldError> {
    let media_ref = media_ref.trim();
    if media_ref.is_empty() {
        return Err(FieldError::MissingPhoto);
    }
    Ok(media_ref.to_string())
}

pub fn validate_gender(key: &str) -> Result<Gender, FieldError> {
    Gender::parse(key).ok_or_else(|| FieldError::UnknownGender(key.to_string()))
}

pub fn validate_faculty(index: usize, faculties: &[String]) -> Result<String, FieldError> {
    faculties
        .get(index)
        .cloned()
        .ok_or(FieldError::UnknownFaculty(index))
}
