//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when input is malformed or violates a policy. It
//!   carries every violation found, keyed by field name.
//! - [`AuthenticationFailed`] thrown when login credentials do not match.
//! - [`NotFound`] thrown when an item does not exist *or* is not owned by the
//!   caller. The two cases are indistinguishable on purpose.
//! - [`InvalidArgument`] thrown for malformed identifiers and unusable tokens.
//! - [`Unauthenticated`] thrown when a bearer token cannot be trusted.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`AuthenticationFailed`]: EngineError::AuthenticationFailed
//!  [`NotFound`]: EngineError::NotFound
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`Unauthenticated`]: EngineError::Unauthenticated
use std::{collections::BTreeMap, fmt};

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

pub(crate) const FIELD_REQUIRED: &str = "This field is required.";
pub(crate) const FIELD_BLANK: &str = "This field may not be blank.";

/// Field-level violations: field name -> messages, in the order they were
/// found.
///
/// Serializes as a plain JSON object, e.g.
/// `{"password": ["This password is too short. ..."]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortcut for a set holding one message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Append all violations of `other`, keeping per-field order.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, empty when the field is clean.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise a
    /// [`EngineError::Validation`] carrying the whole set.
    pub fn into_result(self) -> Result<(), EngineError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("Invalid email or password")]
    AuthenticationFailed,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<FieldErrors> for EngineError {
    fn from(value: FieldErrors) -> Self {
        Self::Validation(value)
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::AuthenticationFailed, Self::AuthenticationFailed) => true,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::Unauthenticated(a), Self::Unauthenticated(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_accumulate_in_order() {
        let mut errors = FieldErrors::new();
        errors.add("password", "first");
        errors.add("confirm_password", "mismatch");
        errors.add("password", "second");

        assert_eq!(errors.get("password"), ["first", "second"]);
        assert_eq!(errors.get("confirm_password"), ["mismatch"]);
        assert!(errors.get("email").is_empty());
    }

    #[test]
    fn merge_appends_to_existing_fields() {
        let mut errors = FieldErrors::single("password", "a");
        let mut other = FieldErrors::single("password", "b");
        other.add("email", "c");
        errors.merge(other);

        assert_eq!(errors.get("password"), ["a", "b"]);
        assert!(errors.contains("email"));
    }

    #[test]
    fn empty_set_is_ok() {
        assert_eq!(FieldErrors::new().into_result(), Ok(()));
        assert!(matches!(
            FieldErrors::single("x", "y").into_result(),
            Err(EngineError::Validation(_))
        ));
    }
}
