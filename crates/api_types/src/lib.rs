//! Wire types of the moneta HTTP API.
//!
//! Request bodies keep every field optional: the engine decides what is
//! required, so a missing field becomes a field-level error instead of a
//! generic parse failure. Unknown fields (`id`, `user`, timestamps...) are
//! ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::IgnoredAny};
use uuid::Uuid;

/// A scalar request field as submitted.
///
/// Strings pass through and numbers are read as their decimal text, so
/// `2500` and `"2500"` are the same amount. Any other JSON value is kept
/// as [`ScalarInput::Invalid`] and reported against its own field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarInput {
    Text(String),
    Integer(i64),
    Float(f64),
    #[serde(skip_serializing)]
    Invalid(IgnoredAny),
}

impl ScalarInput {
    /// Text handed to the engine; `None` for a value of the wrong type.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Integer(number) => Some(number.to_string()),
            Self::Float(number) => Some(number.to_string()),
            Self::Invalid(_) => None,
        }
    }
}

/// Body carrying only a human-readable message.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of non-field errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

pub mod user {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SignupRequest {
        pub email: Option<ScalarInput>,
        pub username: Option<ScalarInput>,
        pub first_name: Option<ScalarInput>,
        pub last_name: Option<ScalarInput>,
        pub password: Option<ScalarInput>,
        pub confirm_password: Option<ScalarInput>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignupResponse {
        pub id: Uuid,
        pub email: String,
        pub message: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: Option<ScalarInput>,
        pub password: Option<ScalarInput>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub access: String,
        pub refresh: String,
        pub id: Uuid,
        pub email: String,
        pub message: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LogoutRequest {
        pub refresh: Option<ScalarInput>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TokenRefreshRequest {
        pub refresh: Option<ScalarInput>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenRefreshResponse {
        pub access: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserProfile {
        pub id: Uuid,
        pub email: String,
        pub username: String,
        pub first_name: String,
        pub last_name: String,
    }

    /// PUT/PATCH body for a profile. The password cannot be changed here.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub email: Option<ScalarInput>,
        pub username: Option<ScalarInput>,
        pub first_name: Option<ScalarInput>,
        pub last_name: Option<ScalarInput>,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum Category {
        Food,
        Transport,
        Rent,
        Utilities,
        Entertainment,
        Healthcare,
        Education,
        Other,
    }

    /// One entry of `GET /expenditure/categories`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryChoice {
        pub value: Category,
        pub label: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IncomeWrite {
        pub name_of_revenue: Option<ScalarInput>,
        pub amount: Option<ScalarInput>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeView {
        pub id: Uuid,
        pub name_of_revenue: String,
        /// Two decimals, e.g. `"2500.00"`.
        pub amount: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenditureWrite {
        /// Raw value so an unknown category becomes a field error.
        pub category: Option<ScalarInput>,
        pub name_of_item: Option<ScalarInput>,
        #[serde(alias = "estimated_amount")]
        pub amount: Option<ScalarInput>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenditureView {
        pub id: Uuid,
        pub category: Category,
        pub name_of_item: String,
        pub amount: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}
