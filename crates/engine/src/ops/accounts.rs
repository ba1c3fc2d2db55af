use sea_orm::{
    ActiveValue, DatabaseTransaction, DbErr, QueryOrder, SqlErr, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, FieldErrors, ProfileChanges, ResultEngine, SignupCmd, User, WriteMode,
    error::FIELD_REQUIRED,
    password::{CONFIRM_FIELD, PASSWORD_FIELD},
    users,
    util::{self, NAME_MAX_CHARS},
};

use super::{Engine, Identity, with_tx};

const EMAIL_TAKEN: &str = "A user with this email already exists.";
const USERNAME_TAKEN: &str = "A user with this username already exists.";
const INVALID_USER_ID: &str = "Invalid user ID";
const NOT_ALLOWED: &str = "You do not have permission to perform this action.";

/// Map a unique-index violation on `users` back to the offending field.
fn duplicate_user_field(err: &DbErr) -> Option<FieldErrors> {
    let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() else {
        return None;
    };
    if detail.contains("email") {
        Some(FieldErrors::single("email", EMAIL_TAKEN))
    } else if detail.contains("username") {
        Some(FieldErrors::single("username", USERNAME_TAKEN))
    } else {
        None
    }
}

/// First/last name: may be blank, but a full update must still send it.
fn profile_name(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    mode: WriteMode,
) -> Option<String> {
    if value.is_none() && !mode.is_partial() {
        errors.add(field, FIELD_REQUIRED);
    }
    util::optional_text(errors, field, value, NAME_MAX_CHARS)
}

fn map_user_write_error(err: DbErr) -> EngineError {
    match duplicate_user_field(&err) {
        Some(errors) => EngineError::Validation(errors),
        None => EngineError::Database(err),
    }
}

fn parse_user_id(raw: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| EngineError::InvalidArgument(INVALID_USER_ID.to_string()))
}

impl Engine {
    /// Create an account.
    ///
    /// All field problems are reported together: format errors, taken
    /// email/username and every password-policy violation.
    pub async fn signup(&self, cmd: SignupCmd) -> ResultEngine<User> {
        let mut errors = FieldErrors::new();
        let email = util::email(&mut errors, "email", cmd.email.as_deref(), WriteMode::Full);
        let username = util::username(
            &mut errors,
            "username",
            cmd.username.as_deref(),
            WriteMode::Full,
        );
        let first_name = util::optional_text(
            &mut errors,
            "first_name",
            cmd.first_name.as_deref(),
            NAME_MAX_CHARS,
        );
        let last_name = util::optional_text(
            &mut errors,
            "last_name",
            cmd.last_name.as_deref(),
            NAME_MAX_CHARS,
        );
        let password = util::secret(&mut errors, PASSWORD_FIELD, cmd.password.as_deref());
        let confirm = util::secret(&mut errors, CONFIRM_FIELD, cmd.confirm_password.as_deref());

        match (password, confirm) {
            (Some(password), Some(confirm)) => {
                if let Err(policy_errors) = self.policy.validate(password, confirm) {
                    errors.merge(policy_errors);
                }
            }
            (Some(password), None) => {
                for message in self.policy.strength_violations(password) {
                    errors.add(PASSWORD_FIELD, message);
                }
            }
            _ => {}
        }

        with_tx!(self, |db_tx| {
            self.check_user_uniqueness(
                &db_tx,
                &mut errors,
                email.as_deref(),
                username.as_deref(),
                None,
            )
            .await?;
            errors.into_result()?;

            let (Some(email), Some(username), Some(password)) = (email, username, password)
            else {
                return Err(EngineError::Internal(
                    "signup fields missing after validation".to_string(),
                ));
            };
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                email: ActiveValue::Set(email),
                username: ActiveValue::Set(username),
                first_name: ActiveValue::Set(first_name.unwrap_or_default()),
                last_name: ActiveValue::Set(last_name.unwrap_or_default()),
                password: ActiveValue::Set(self.hasher.hash(password)?),
                created_at: ActiveValue::Set(util::now()),
            }
            .insert(&db_tx)
            .await
            .map_err(map_user_write_error)?;

            User::try_from(model)
        })
    }

    /// Profile projection of any user, by raw path id.
    pub async fn profile(&self, user_id: &str) -> ResultEngine<User> {
        let user_id = parse_user_id(user_id)?;
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    /// Update a profile. Only the owner of the profile may do it.
    ///
    /// With [`WriteMode::Full`] every profile field must be present.
    pub async fn update_profile(
        &self,
        user_id: &str,
        changes: ProfileChanges,
        mode: WriteMode,
        actor: &Identity,
    ) -> ResultEngine<User> {
        let user_id = parse_user_id(user_id)?;
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            if actor.id != user_id {
                return Err(EngineError::Forbidden(NOT_ALLOWED.to_string()));
            }

            let mut errors = FieldErrors::new();
            let email = util::email(&mut errors, "email", changes.email.as_deref(), mode);
            let username =
                util::username(&mut errors, "username", changes.username.as_deref(), mode);
            let first_name =
                profile_name(&mut errors, "first_name", changes.first_name.as_deref(), mode);
            let last_name =
                profile_name(&mut errors, "last_name", changes.last_name.as_deref(), mode);
            self.check_user_uniqueness(
                &db_tx,
                &mut errors,
                email.as_deref(),
                username.as_deref(),
                Some(user_id),
            )
            .await?;
            errors.into_result()?;

            let mut active: users::ActiveModel = model.into();
            if let Some(email) = email {
                active.email = ActiveValue::Set(email);
            }
            if let Some(username) = username {
                active.username = ActiveValue::Set(username);
            }
            if let Some(first_name) = first_name {
                active.first_name = ActiveValue::Set(first_name);
            }
            if let Some(last_name) = last_name {
                active.last_name = ActiveValue::Set(last_name);
            }
            let model = active.update(&db_tx).await.map_err(map_user_write_error)?;
            User::try_from(model)
        })
    }

    /// Every account, oldest first.
    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            users::Entity::find()
                .order_by_asc(users::Column::CreatedAt)
                .order_by_asc(users::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(User::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    async fn check_user_uniqueness(
        &self,
        db: &DatabaseTransaction,
        errors: &mut FieldErrors,
        email: Option<&str>,
        username: Option<&str>,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        if let Some(email) = email
            && self
                .user_field_taken(db, users::Column::Email, email, except)
                .await?
        {
            errors.add("email", EMAIL_TAKEN);
        }
        if let Some(username) = username
            && self
                .user_field_taken(db, users::Column::Username, username, except)
                .await?
        {
            errors.add("username", USERNAME_TAKEN);
        }
        Ok(())
    }
}
