//! Expenditure endpoints. Every operation is scoped to the caller.

use api_types::ledger::{Category, CategoryChoice, ExpenditureView, ExpenditureWrite};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Expenditure, ExpenditureFields, Identity, WriteMode};

use crate::{Payload, Scalars, ServerError, server::ServerState};

fn category_view(category: engine::Category) -> Category {
    match category {
        engine::Category::Food => Category::Food,
        engine::Category::Transport => Category::Transport,
        engine::Category::Rent => Category::Rent,
        engine::Category::Utilities => Category::Utilities,
        engine::Category::Entertainment => Category::Entertainment,
        engine::Category::Healthcare => Category::Healthcare,
        engine::Category::Education => Category::Education,
        engine::Category::Other => Category::Other,
    }
}

fn expenditure_view(expenditure: Expenditure) -> ExpenditureView {
    ExpenditureView {
        id: expenditure.id,
        category: category_view(expenditure.category),
        name_of_item: expenditure.name_of_item,
        amount: expenditure.amount.to_string(),
        created_at: expenditure.created_at,
        updated_at: expenditure.updated_at,
    }
}

fn expenditure_fields(payload: ExpenditureWrite) -> Result<ExpenditureFields, ServerError> {
    let mut scalars = Scalars::default();
    let fields = ExpenditureFields {
        category: scalars.text("category", payload.category),
        name_of_item: scalars.text("name_of_item", payload.name_of_item),
        amount: scalars.number("amount", payload.amount),
    };
    scalars.finish(fields)
}

/// The fixed category list with display labels.
pub async fn categories(Extension(_identity): Extension<Identity>) -> Json<Vec<CategoryChoice>> {
    Json(
        engine::Category::ALL
            .into_iter()
            .map(|category| CategoryChoice {
                value: category_view(category),
                label: category.label().to_string(),
            })
            .collect(),
    )
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExpenditureView>>, ServerError> {
    let expenditures = state.engine.expenditures(identity.id).await?;
    Ok(Json(
        expenditures.into_iter().map(expenditure_view).collect(),
    ))
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Payload(payload): Payload<ExpenditureWrite>,
) -> Result<(StatusCode, Json<ExpenditureView>), ServerError> {
    let expenditure = state
        .engine
        .create_expenditure(expenditure_fields(payload)?, identity.id)
        .await?;
    Ok((StatusCode::CREATED, Json(expenditure_view(expenditure))))
}

pub async fn retrieve(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(expenditure_id): Path<String>,
) -> Result<Json<ExpenditureView>, ServerError> {
    let expenditure = state
        .engine
        .expenditure(&expenditure_id, identity.id)
        .await?;
    Ok(Json(expenditure_view(expenditure)))
}

pub async fn replace(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(expenditure_id): Path<String>,
    Payload(payload): Payload<ExpenditureWrite>,
) -> Result<Json<ExpenditureView>, ServerError> {
    let expenditure = state
        .engine
        .update_expenditure(
            &expenditure_id,
            expenditure_fields(payload)?,
            WriteMode::Full,
            identity.id,
        )
        .await?;
    Ok(Json(expenditure_view(expenditure)))
}

pub async fn patch(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(expenditure_id): Path<String>,
    Payload(payload): Payload<ExpenditureWrite>,
) -> Result<Json<ExpenditureView>, ServerError> {
    let expenditure = state
        .engine
        .update_expenditure(
            &expenditure_id,
            expenditure_fields(payload)?,
            WriteMode::Partial,
            identity.id,
        )
        .await?;
    Ok(Json(expenditure_view(expenditure)))
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(expenditure_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expenditure(&expenditure_id, identity.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
