//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. Each reader takes the
//! raw submitted value, records violations into a shared [`FieldErrors`] and
//! returns the normalized value when the field is usable, so a handler can
//! collect every problem of a request before failing.

use chrono::{DateTime, SubsecRound, Utc};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{
    EngineError, FieldErrors, ResultEngine, WriteMode,
    error::{FIELD_BLANK, FIELD_REQUIRED},
};

pub(crate) const NAME_MAX_CHARS: usize = 150;
pub(crate) const TEXT_MAX_CHARS: usize = 255;
pub(crate) const EMAIL_MAX_CHARS: usize = 254;

const INVALID_EMAIL: &str = "Enter a valid email address.";
const EMAIL_TLD_MIN_CHARS: usize = 2;
const EMAIL_LABEL_MAX_CHARS: usize = 63;
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, \
                                numbers, and @/./+/-/_ characters.";

/// Current time at the precision the database keeps.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Internal(format!("invalid stored {label} id")))
}

fn too_long(max_chars: usize) -> String {
    format!("Ensure this field has no more than {max_chars} characters.")
}

/// Read a required, non-blank text field.
///
/// In [`WriteMode::Partial`] an absent field is skipped without error and
/// yields `None`. Surrounding whitespace is trimmed.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_chars: usize,
    mode: WriteMode,
) -> Option<String> {
    let Some(raw) = value else {
        if !mode.is_partial() {
            errors.add(field, FIELD_REQUIRED);
        }
        return None;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, FIELD_BLANK);
        return None;
    }
    if trimmed.chars().count() > max_chars {
        errors.add(field, too_long(max_chars));
        return None;
    }
    Some(trimmed.to_string())
}

/// Read a text field that may be blank. Absent yields `None`.
pub(crate) fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_chars: usize,
) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.chars().count() > max_chars {
        errors.add(field, too_long(max_chars));
        return None;
    }
    Some(trimmed.to_string())
}

/// Read a secret (password, token). Unlike text fields it is never trimmed.
pub(crate) fn secret<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value {
        None => {
            errors.add(field, FIELD_REQUIRED);
            None
        }
        Some(raw) if raw.trim().is_empty() => {
            errors.add(field, FIELD_BLANK);
            None
        }
        Some(raw) => Some(raw),
    }
}

/// Read and normalize an email address.
pub(crate) fn email(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    mode: WriteMode,
) -> Option<String> {
    let raw = required_text(errors, field, value, EMAIL_MAX_CHARS, mode)?;
    if !is_valid_email(&raw) {
        errors.add(field, INVALID_EMAIL);
        return None;
    }
    Some(normalize_email(&raw))
}

/// Read and normalize a username.
pub(crate) fn username(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    mode: WriteMode,
) -> Option<String> {
    let raw = required_text(errors, field, value, NAME_MAX_CHARS, mode)?;
    let normalized = normalize_username(&raw);
    if !normalized
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(field, INVALID_USERNAME);
        return None;
    }
    Some(normalized)
}

/// Lowercase the domain part, keep the local part as typed.
pub(crate) fn normalize_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.trim().to_string(),
    }
}

/// NFKC-normalize so visually identical usernames compare equal.
pub(crate) fn normalize_username(username: &str) -> String {
    username.nfkc().collect()
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains('@') || local.starts_with('.') || local.ends_with('.') {
        return false;
    }
    if domain.eq_ignore_ascii_case("localhost") {
        return true;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    host.split('.').all(|label| is_valid_label(label, 1))
        && is_valid_label(tld, EMAIL_TLD_MIN_CHARS)
}

fn is_valid_label(label: &str, min_chars: usize) -> bool {
    let len = label.chars().count();
    (min_chars..=EMAIL_LABEL_MAX_CHARS).contains(&len)
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_alphanumeric() || c == '-')
}
