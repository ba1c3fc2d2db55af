use sea_orm::{ActiveValue, QueryFilter, SqlErr, TransactionTrait, prelude::*};

use crate::{
    EngineError, FieldErrors, LoginCmd, ResultEngine, TokenKind, TokenPair, User, WriteMode,
    password::PASSWORD_FIELD,
    token_blacklist,
    util::{self, EMAIL_MAX_CHARS},
};

use super::{Engine, Identity, access::USER_NOT_FOUND, with_tx};

const INVALID_REFRESH: &str = "Invalid refresh token";
const TOKEN_INVALID: &str = "Token is invalid or expired";
const TOKEN_BLACKLISTED: &str = "Token is blacklisted";
const ACCESS_INVALID: &str = "Given token not valid for any token type";

/// A successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

impl Engine {
    /// Check credentials and issue a token pair.
    ///
    /// Unknown email and wrong password fail the same way, and both pay for
    /// one hash verification.
    pub async fn login(&self, cmd: LoginCmd) -> ResultEngine<LoginOutcome> {
        let mut errors = FieldErrors::new();
        let email = util::required_text(
            &mut errors,
            "email",
            cmd.email.as_deref(),
            EMAIL_MAX_CHARS,
            WriteMode::Full,
        );
        let password = util::secret(&mut errors, PASSWORD_FIELD, cmd.password.as_deref());
        errors.into_result()?;
        let (Some(email), Some(password)) = (email, password) else {
            return Err(EngineError::AuthenticationFailed);
        };
        let email = util::normalize_email(&email);

        let model = with_tx!(self, |db_tx| self.find_user_by_email(&db_tx, &email).await)?;
        let Some(model) = model else {
            self.hasher.verify_dummy(password);
            return Err(EngineError::AuthenticationFailed);
        };
        if !self.hasher.verify(password, &model.password) {
            return Err(EngineError::AuthenticationFailed);
        }

        let user = User::try_from(model)?;
        let tokens = self.sessions.issue_pair(user.id, util::now())?;
        Ok(LoginOutcome { user, tokens })
    }

    /// Revoke a refresh token belonging to `actor`.
    ///
    /// Absent, malformed, expired, foreign or already revoked tokens all fail
    /// with the same [`EngineError::InvalidArgument`].
    pub async fn logout(&self, refresh: Option<&str>, actor: &Identity) -> ResultEngine<()> {
        let invalid = || EngineError::InvalidArgument(INVALID_REFRESH.to_string());

        let token = refresh.map(str::trim).filter(|t| !t.is_empty()).ok_or_else(invalid)?;
        let claims = self
            .sessions
            .decode(token, TokenKind::Refresh)
            .map_err(|_| invalid())?;
        if claims.sub != actor.id {
            return Err(invalid());
        }

        with_tx!(self, |db_tx| {
            let jti = claims.jti.to_string();
            if token_blacklist::Entity::find_by_id(jti.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(invalid());
            }
            let row = token_blacklist::ActiveModel {
                jti: ActiveValue::Set(jti),
                user_id: ActiveValue::Set(actor.id.to_string()),
                expires_at: ActiveValue::Set(claims.expires_at()),
                blacklisted_at: ActiveValue::Set(util::now()),
            };
            match row.insert(&db_tx).await {
                Ok(_) => Ok(()),
                Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    Err(invalid())
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    /// Exchange a live refresh token for a new access token.
    pub async fn refresh_access(&self, refresh: Option<&str>) -> ResultEngine<String> {
        let mut errors = FieldErrors::new();
        let token = util::secret(&mut errors, "refresh", refresh);
        errors.into_result()?;
        let token = token.unwrap_or_default().trim();

        let claims = self
            .sessions
            .decode(token, TokenKind::Refresh)
            .map_err(|_| EngineError::InvalidArgument(TOKEN_INVALID.to_string()))?;

        let revoked = with_tx!(self, |db_tx| {
            token_blacklist::Entity::find_by_id(claims.jti.to_string())
                .one(&db_tx)
                .await
                .map(|row| row.is_some())
                .map_err(EngineError::from)
        })?;
        if revoked {
            return Err(EngineError::InvalidArgument(TOKEN_BLACKLISTED.to_string()));
        }

        self.sessions.issue_access(claims.sub, util::now())
    }

    /// Resolve the caller behind an access token.
    pub async fn authenticate(&self, access: &str) -> ResultEngine<Identity> {
        let claims = self
            .sessions
            .decode(access, TokenKind::Access)
            .map_err(|_| EngineError::Unauthenticated(ACCESS_INVALID.to_string()))?;

        let model = with_tx!(self, |db_tx| self.find_user_by_id(&db_tx, claims.sub).await)?;
        match model {
            Some(model) => Identity::try_from(&model),
            None => Err(EngineError::Unauthenticated(USER_NOT_FOUND.to_string())),
        }
    }

    /// Drop blacklist rows whose token has expired anyway. Returns how many
    /// rows were removed.
    pub async fn flush_expired_tokens(&self) -> ResultEngine<u64> {
        let now = util::now();
        with_tx!(self, |db_tx| {
            token_blacklist::Entity::delete_many()
                .filter(token_blacklist::Column::ExpiresAt.lt(now))
                .exec(&db_tx)
                .await
                .map(|res| res.rows_affected)
                .map_err(EngineError::from)
        })
    }
}
