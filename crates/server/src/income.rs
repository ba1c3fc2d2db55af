//! Income endpoints. Every operation is scoped to the caller.

use api_types::ledger::{IncomeView, IncomeWrite};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Identity, Income, IncomeFields, WriteMode};

use crate::{Payload, Scalars, ServerError, server::ServerState};

fn income_view(income: Income) -> IncomeView {
    IncomeView {
        id: income.id,
        name_of_revenue: income.name_of_revenue,
        amount: income.amount.to_string(),
        created_at: income.created_at,
        updated_at: income.updated_at,
    }
}

fn income_fields(payload: IncomeWrite) -> Result<IncomeFields, ServerError> {
    let mut scalars = Scalars::default();
    let fields = IncomeFields {
        name_of_revenue: scalars.text("name_of_revenue", payload.name_of_revenue),
        amount: scalars.number("amount", payload.amount),
    };
    scalars.finish(fields)
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<IncomeView>>, ServerError> {
    let incomes = state.engine.incomes(identity.id).await?;
    Ok(Json(incomes.into_iter().map(income_view).collect()))
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Payload(payload): Payload<IncomeWrite>,
) -> Result<(StatusCode, Json<IncomeView>), ServerError> {
    let income = state
        .engine
        .create_income(income_fields(payload)?, identity.id)
        .await?;
    Ok((StatusCode::CREATED, Json(income_view(income))))
}

pub async fn retrieve(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(income_id): Path<String>,
) -> Result<Json<IncomeView>, ServerError> {
    let income = state.engine.income(&income_id, identity.id).await?;
    Ok(Json(income_view(income)))
}

pub async fn replace(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(income_id): Path<String>,
    Payload(payload): Payload<IncomeWrite>,
) -> Result<Json<IncomeView>, ServerError> {
    let income = state
        .engine
        .update_income(
            &income_id,
            income_fields(payload)?,
            WriteMode::Full,
            identity.id,
        )
        .await?;
    Ok(Json(income_view(income)))
}

pub async fn patch(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(income_id): Path<String>,
    Payload(payload): Payload<IncomeWrite>,
) -> Result<Json<IncomeView>, ServerError> {
    let income = state
        .engine
        .update_income(
            &income_id,
            income_fields(payload)?,
            WriteMode::Partial,
            identity.id,
        )
        .await?;
    Ok(Json(income_view(income)))
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(income_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_income(&income_id, identity.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
