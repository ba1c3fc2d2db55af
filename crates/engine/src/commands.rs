//! Command structs for engine operations.
//!
//! Every field is the raw submitted value: `None` means the field was absent
//! from the request, which matters for required-field and partial-update
//! handling. Normalization and validation happen in the engine.

/// Whether a write replaces the whole record or only the supplied fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Every mutable field must be present.
    Full,
    /// Absent fields keep their stored value.
    Partial,
}

impl WriteMode {
    pub(crate) fn is_partial(self) -> bool {
        matches!(self, Self::Partial)
    }
}

/// Create an account.
#[derive(Clone, Debug, Default)]
pub struct SignupCmd {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl SignupCmd {
    /// Shortcut for the four required fields.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: Some(email.into()),
            username: Some(username.into()),
            password: Some(password.into()),
            confirm_password: Some(confirm_password.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    #[must_use]
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoginCmd {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginCmd {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }
}

/// Profile fields to write. The credential is not reachable from here.
#[derive(Clone, Debug, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileChanges {
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    #[must_use]
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }
}

/// Writable fields of an income record.
#[derive(Clone, Debug, Default)]
pub struct IncomeFields {
    pub name_of_revenue: Option<String>,
    /// Decimal text, e.g. `"2500.00"`.
    pub amount: Option<String>,
}

impl IncomeFields {
    #[must_use]
    pub fn new(name_of_revenue: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name_of_revenue: Some(name_of_revenue.into()),
            amount: Some(amount.into()),
        }
    }

    #[must_use]
    pub fn name_of_revenue(mut self, name: impl Into<String>) -> Self {
        self.name_of_revenue = Some(name.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }
}

/// Writable fields of an expenditure record.
#[derive(Clone, Debug, Default)]
pub struct ExpenditureFields {
    /// Stored category value, e.g. `"FOOD"`.
    pub category: Option<String>,
    pub name_of_item: Option<String>,
    pub amount: Option<String>,
}

impl ExpenditureFields {
    #[must_use]
    pub fn new(name_of_item: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            category: None,
            name_of_item: Some(name_of_item.into()),
            amount: Some(amount.into()),
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn name_of_item(mut self, name: impl Into<String>) -> Self {
        self.name_of_item = Some(name.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }
}
