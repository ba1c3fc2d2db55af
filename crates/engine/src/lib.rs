//! Domain core of the moneta service.
//!
//! The engine owns accounts, sessions and the per-user ledger (incomes and
//! expenditures). It knows nothing about HTTP: callers hand it raw field
//! values and an authenticated [`Identity`], and get back domain types or an
//! [`EngineError`].
//!
//! Ledger reads and writes are always scoped to the owner passed in; a record
//! owned by someone else is indistinguishable from a missing one.

pub use commands::{
    ExpenditureFields, IncomeFields, LoginCmd, ProfileChanges, SignupCmd, WriteMode,
};
pub use error::{EngineError, FieldErrors};
pub use expenditures::{Category, Expenditure};
pub use incomes::Income;
pub use money::{Amount, AmountError, AmountLimits};
pub use ops::{Engine, EngineBuilder, Identity, LoginOutcome};
pub use password::{CredentialHasher, PasswordPolicy};
pub use session::{Claims, SessionIssuer, TokenKind, TokenPair, TokenRejection};
pub use users::User;

mod commands;
mod error;
mod expenditures;
mod incomes;
mod money;
mod ops;
mod password;
mod session;
mod token_blacklist;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
