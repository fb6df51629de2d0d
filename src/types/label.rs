// ABOUTME: RFC 1123 DNS label validation shared by app names and namespaces.
// ABOUTME: Cluster objects reject anything outside lowercase alphanumerics and hyphens.

use thiserror::Error;

/// Maximum length of a DNS label.
pub const MAX_LABEL_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{0} exceeds maximum length of 63 characters")]
    TooLong(&'static str),

    #[error("{0} cannot start with a hyphen")]
    StartsWithHyphen(&'static str),

    #[error("{0} cannot end with a hyphen")]
    EndsWithHyphen(&'static str),

    #[error("{0} must be lowercase")]
    NotLowercase(&'static str),

    #[error("invalid character in {what}: '{ch}'")]
    InvalidChar { what: &'static str, ch: char },
}

/// Validate `value` as a DNS label. `what` names the field in error messages.
pub(crate) fn validate(value: &str, what: &'static str) -> Result<(), LabelError> {
    if value.is_empty() {
        return Err(LabelError::Empty(what));
    }

    if value.len() > MAX_LABEL_LEN {
        return Err(LabelError::TooLong(what));
    }

    if value.starts_with('-') {
        return Err(LabelError::StartsWithHyphen(what));
    }

    if value.ends_with('-') {
        return Err(LabelError::EndsWithHyphen(what));
    }

    for ch in value.chars() {
        if ch.is_ascii_uppercase() {
            return Err(LabelError::NotLowercase(what));
        }
        if !ch.is_ascii_lowercase() && !ch.is_ascii_digit() && ch != '-' {
            return Err(LabelError::InvalidChar { what, ch });
        }
    }

    Ok(())
}
