use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Amount, AmountLimits, EngineError, FieldErrors, Income, IncomeFields, ResultEngine, WriteMode,
    incomes,
    util::{self, TEXT_MAX_CHARS},
};

use super::{
    Engine,
    access::{ENTRY_NOT_FOUND, parse_entry_id},
    read_amount, with_tx,
};

impl Engine {
    /// All incomes of `owner`, oldest first.
    pub async fn incomes(&self, owner: Uuid) -> ResultEngine<Vec<Income>> {
        with_tx!(self, |db_tx| {
            incomes::Entity::find()
                .filter(incomes::Column::UserId.eq(owner.to_string()))
                .order_by_asc(incomes::Column::CreatedAt)
                .order_by_asc(incomes::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Income::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn income(&self, income_id: &str, owner: Uuid) -> ResultEngine<Income> {
        let income_id = parse_entry_id(income_id)?;
        with_tx!(self, |db_tx| {
            let model = self.require_owned_income(&db_tx, income_id, owner).await?;
            Income::try_from(model)
        })
    }

    /// Record a new income for `owner`.
    pub async fn create_income(&self, fields: IncomeFields, owner: Uuid) -> ResultEngine<Income> {
        let mut errors = FieldErrors::new();
        let (name, amount) = read_income_fields(&mut errors, &fields, WriteMode::Full);
        errors.into_result()?;
        let (Some(name), Some(amount)) = (name, amount) else {
            return Err(EngineError::Internal(
                "income fields missing after validation".to_string(),
            ));
        };

        let income = Income::new(owner, name, amount, util::now());
        with_tx!(self, |db_tx| {
            let model: incomes::ActiveModel = (&income).into();
            model.insert(&db_tx).await?;
            Ok(income)
        })
    }

    /// Overwrite an income. In [`WriteMode::Partial`] absent fields keep their
    /// value.
    pub async fn update_income(
        &self,
        income_id: &str,
        fields: IncomeFields,
        mode: WriteMode,
        owner: Uuid,
    ) -> ResultEngine<Income> {
        let income_id = parse_entry_id(income_id)?;
        with_tx!(self, |db_tx| {
            let model = self.require_owned_income(&db_tx, income_id, owner).await?;

            let mut errors = FieldErrors::new();
            let (name, amount) = read_income_fields(&mut errors, &fields, mode);
            errors.into_result()?;

            let mut active: incomes::ActiveModel = model.into();
            if let Some(name) = name {
                active.name_of_revenue = ActiveValue::Set(name);
            }
            if let Some(amount) = amount {
                active.amount_minor = ActiveValue::Set(amount.minor());
            }
            active.updated_at = ActiveValue::Set(util::now());
            let model = active.update(&db_tx).await?;
            Income::try_from(model)
        })
    }

    pub async fn delete_income(&self, income_id: &str, owner: Uuid) -> ResultEngine<()> {
        let income_id = parse_entry_id(income_id)?;
        with_tx!(self, |db_tx| {
            let res = incomes::Entity::delete_many()
                .filter(incomes::Column::Id.eq(income_id.to_string()))
                .filter(incomes::Column::UserId.eq(owner.to_string()))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::NotFound(ENTRY_NOT_FOUND.to_string()));
            }
            Ok(())
        })
    }
}

fn read_income_fields(
    errors: &mut FieldErrors,
    fields: &IncomeFields,
    mode: WriteMode,
) -> (Option<String>, Option<Amount>) {
    let name = util::required_text(
        errors,
        "name_of_revenue",
        fields.name_of_revenue.as_deref(),
        TEXT_MAX_CHARS,
        mode,
    );
    let amount = read_amount(
        errors,
        "amount",
        fields.amount.as_deref(),
        AmountLimits::INCOME,
        mode,
    );
    (name, amount)
}
