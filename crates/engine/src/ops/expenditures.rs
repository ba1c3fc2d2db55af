use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Amount, AmountLimits, Category, EngineError, Expenditure, ExpenditureFields, FieldErrors,
    ResultEngine, WriteMode,
    error::FIELD_REQUIRED,
    expenditures,
    util::{self, TEXT_MAX_CHARS},
};

use super::{
    Engine,
    access::{ENTRY_NOT_FOUND, parse_entry_id},
    read_amount, with_tx,
};

/// Validated expenditure input; `None` means "not supplied".
struct ExpenditureInput {
    category: Option<Category>,
    name_of_item: Option<String>,
    amount: Option<Amount>,
}

impl Engine {
    /// All expenditures of `owner`, oldest first.
    pub async fn expenditures(&self, owner: Uuid) -> ResultEngine<Vec<Expenditure>> {
        with_tx!(self, |db_tx| {
            expenditures::Entity::find()
                .filter(expenditures::Column::UserId.eq(owner.to_string()))
                .order_by_asc(expenditures::Column::CreatedAt)
                .order_by_asc(expenditures::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Expenditure::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn expenditure(
        &self,
        expenditure_id: &str,
        owner: Uuid,
    ) -> ResultEngine<Expenditure> {
        let expenditure_id = parse_entry_id(expenditure_id)?;
        with_tx!(self, |db_tx| {
            let model = self
                .require_owned_expenditure(&db_tx, expenditure_id, owner)
                .await?;
            Expenditure::try_from(model)
        })
    }

    /// Record a new expenditure for `owner`. The category defaults to
    /// [`Category::Other`].
    pub async fn create_expenditure(
        &self,
        fields: ExpenditureFields,
        owner: Uuid,
    ) -> ResultEngine<Expenditure> {
        let mut errors = FieldErrors::new();
        let input = read_expenditure_fields(&mut errors, &fields, WriteMode::Full);
        errors.into_result()?;
        let (Some(name_of_item), Some(amount)) = (input.name_of_item, input.amount) else {
            return Err(EngineError::Internal(
                "expenditure fields missing after validation".to_string(),
            ));
        };

        let expenditure = Expenditure::new(
            owner,
            input.category.unwrap_or_default(),
            name_of_item,
            amount,
            util::now(),
        );
        with_tx!(self, |db_tx| {
            let model: expenditures::ActiveModel = (&expenditure).into();
            model.insert(&db_tx).await?;
            Ok(expenditure)
        })
    }

    /// Overwrite an expenditure. A full update must name the category too.
    pub async fn update_expenditure(
        &self,
        expenditure_id: &str,
        fields: ExpenditureFields,
        mode: WriteMode,
        owner: Uuid,
    ) -> ResultEngine<Expenditure> {
        let expenditure_id = parse_entry_id(expenditure_id)?;
        with_tx!(self, |db_tx| {
            let model = self
                .require_owned_expenditure(&db_tx, expenditure_id, owner)
                .await?;

            let mut errors = FieldErrors::new();
            if mode == WriteMode::Full && fields.category.is_none() {
                errors.add("category", FIELD_REQUIRED);
            }
            let input = read_expenditure_fields(&mut errors, &fields, mode);
            errors.into_result()?;

            let mut active: expenditures::ActiveModel = model.into();
            if let Some(category) = input.category {
                active.category = ActiveValue::Set(category.as_str().to_string());
            }
            if let Some(name_of_item) = input.name_of_item {
                active.name_of_item = ActiveValue::Set(name_of_item);
            }
            if let Some(amount) = input.amount {
                active.amount_minor = ActiveValue::Set(amount.minor());
            }
            active.updated_at = ActiveValue::Set(util::now());
            let model = active.update(&db_tx).await?;
            Expenditure::try_from(model)
        })
    }

    pub async fn delete_expenditure(
        &self,
        expenditure_id: &str,
        owner: Uuid,
    ) -> ResultEngine<()> {
        let expenditure_id = parse_entry_id(expenditure_id)?;
        with_tx!(self, |db_tx| {
            let res = expenditures::Entity::delete_many()
                .filter(expenditures::Column::Id.eq(expenditure_id.to_string()))
                .filter(expenditures::Column::UserId.eq(owner.to_string()))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::NotFound(ENTRY_NOT_FOUND.to_string()));
            }
            Ok(())
        })
    }
}

/// An absent category is not reported here: create defaults it and a full
/// update checks it separately.
fn read_expenditure_fields(
    errors: &mut FieldErrors,
    fields: &ExpenditureFields,
    mode: WriteMode,
) -> ExpenditureInput {
    let category = match fields.category.as_deref() {
        Some(raw) => match Category::try_from(raw) {
            Ok(category) => Some(category),
            Err(err) => {
                errors.add("category", err.to_string());
                None
            }
        },
        None => None,
    };
    ExpenditureInput {
        category,
        name_of_item: util::required_text(
            errors,
            "name_of_item",
            fields.name_of_item.as_deref(),
            TEXT_MAX_CHARS,
            mode,
        ),
        amount: read_amount(
            errors,
            "amount",
            fields.amount.as_deref(),
            AmountLimits::EXPENDITURE,
            mode,
        ),
    }
}
