use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, expenditures, incomes, users};

use super::Engine;

pub(super) const ENTRY_NOT_FOUND: &str = "Not found.";
pub(super) const USER_NOT_FOUND: &str = "User not found";

/// The authenticated caller, resolved from an access token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl TryFrom<&users::Model> for Identity {
    type Error = EngineError;

    fn try_from(model: &users::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "user")?,
            email: model.email.clone(),
            username: model.username.clone(),
        })
    }
}

/// Path ids that do not parse cannot match any row.
pub(super) fn parse_entry_id(raw: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| EngineError::NotFound(ENTRY_NOT_FOUND.to_string()))
}

/// Generates `find_*` and `require_*` methods that only see rows owned by
/// the given user. A row owned by someone else is reported exactly like a
/// missing one.
macro_rules! impl_owned_lookup {
    ($find_fn:ident, $require_fn:ident, $entity:path, $model:path, $owner_col:expr) => {
        async fn $find_fn(
            &self,
            db: &DatabaseTransaction,
            entry_id: Uuid,
            owner: Uuid,
        ) -> ResultEngine<Option<$model>> {
            <$entity>::find_by_id(entry_id.to_string())
                .filter($owner_col.eq(owner.to_string()))
                .one(db)
                .await
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            entry_id: Uuid,
            owner: Uuid,
        ) -> ResultEngine<$model> {
            self.$find_fn(db, entry_id, owner)
                .await?
                .ok_or_else(|| EngineError::NotFound(ENTRY_NOT_FOUND.to_string()))
        }
    };
}

impl Engine {
    impl_owned_lookup!(
        find_owned_income,
        require_owned_income,
        incomes::Entity,
        incomes::Model,
        incomes::Column::UserId
    );

    impl_owned_lookup!(
        find_owned_expenditure,
        require_owned_expenditure,
        expenditures::Entity,
        expenditures::Model,
        expenditures::Column::UserId
    );

    pub(super) async fn find_user_by_id(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        self.find_user_by_id(db, user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(USER_NOT_FOUND.to_string()))
    }

    pub(super) async fn find_user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// `true` when another user (not `except`) already has `value` in `column`.
    pub(super) async fn user_field_taken(
        &self,
        db: &DatabaseTransaction,
        column: users::Column,
        value: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<bool> {
        let mut query = users::Entity::find().filter(column.eq(value));
        if let Some(except) = except {
            query = query.filter(users::Column::Id.ne(except.to_string()));
        }
        Ok(query.one(db).await?.is_some())
    }
}
