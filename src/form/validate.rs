use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::types::Draft;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,4}$").unwrap()
});

/// Nine digits, landline (2) or mobile (9), no country code.
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[29][0-9]{8}$").unwrap());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required fields missing")]
    MissingField,

    #[error("enter a valid email address")]
    InvalidEmail,

    #[error("enter a valid phone number, e.g. 912345678")]
    InvalidPhone,
}

/// Check a draft before it is submitted. Only the first failing check is
/// reported, in the order: missing fields, email, phone.
pub fn validate(draft: &Draft) -> Result<(), ValidationError> {
    let required = [
        &draft.name,
        &draft.email,
        &draft.phone,
        &draft.region,
        &draft.commune,
    ];
    if required.iter().any(|value| value.is_empty()) {
        return Err(ValidationError::MissingField);
    }

    if !EMAIL.is_match(&draft.email) {
        return Err(ValidationError::InvalidEmail);
    }

    if !PHONE.is_match(&draft.phone) {
        return Err(ValidationError::InvalidPhone);
    }

    Ok(())
}
