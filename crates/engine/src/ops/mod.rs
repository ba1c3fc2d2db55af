use sea_orm::DatabaseConnection;

use crate::{
    Amount, AmountLimits, CredentialHasher, EngineError, FieldErrors, PasswordPolicy,
    ResultEngine, SessionIssuer, WriteMode, error::FIELD_REQUIRED,
};

mod access;
mod accounts;
mod expenditures;
mod incomes;
mod sessions;

pub use access::Identity;
pub use sessions::LoginOutcome;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Service core: accounts, sessions and the per-user ledger.
///
/// Every operation re-reads through the database; nothing is cached between
/// calls.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    sessions: SessionIssuer,
    policy: PasswordPolicy,
    hasher: CredentialHasher,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }

    pub fn password_policy(&self) -> &PasswordPolicy {
        &self.policy
    }
}

/// Read a ledger amount, enforcing the column limits.
fn read_amount(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    limits: AmountLimits,
    mode: WriteMode,
) -> Option<Amount> {
    let Some(raw) = value else {
        if !mode.is_partial() {
            errors.add(field, FIELD_REQUIRED);
        }
        return None;
    };
    match Amount::parse_with_limits(raw, limits) {
        Ok(amount) => Some(amount),
        Err(err) => {
            errors.add(field, err.to_string());
            None
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    sessions: Option<SessionIssuer>,
    policy: PasswordPolicy,
    hasher: Option<CredentialHasher>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the required token issuer
    pub fn sessions(mut self, sessions: SessionIssuer) -> EngineBuilder {
        self.sessions = Some(sessions);
        self
    }

    pub fn password_policy(mut self, policy: PasswordPolicy) -> EngineBuilder {
        self.policy = policy;
        self
    }

    /// Override the Argon2 cost parameters. Defaults to the `argon2` crate
    /// defaults.
    pub fn hasher(mut self, hasher: CredentialHasher) -> EngineBuilder {
        self.hasher = Some(hasher);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let sessions = self
            .sessions
            .ok_or_else(|| EngineError::Internal("session issuer is required".to_string()))?;
        Ok(Engine {
            database: self.database,
            sessions,
            policy: self.policy,
            hasher: self.hasher.unwrap_or_default(),
        })
    }
}
