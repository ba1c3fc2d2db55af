//! The module contains `Expenditure`, its `Category` and its table.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{Amount, EngineError, util::parse_uuid};

/// Spending category of an [`Expenditure`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Transport,
    Rent,
    Utilities,
    Entertainment,
    Healthcare,
    Education,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Rent,
        Category::Utilities,
        Category::Entertainment,
        Category::Healthcare,
        Category::Education,
        Category::Other,
    ];

    /// Stored and wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "FOOD",
            Self::Transport => "TRANSPORT",
            Self::Rent => "RENT",
            Self::Utilities => "UTILITIES",
            Self::Entertainment => "ENTERTAINMENT",
            Self::Healthcare => "HEALTHCARE",
            Self::Education => "EDUCATION",
            Self::Other => "OTHER",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Food => "Food & Groceries",
            Self::Transport => "Transport",
            Self::Rent => "Rent",
            Self::Utilities => "Utilities",
            Self::Entertainment => "Entertainment",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| {
                EngineError::InvalidArgument(format!("\"{value}\" is not a valid choice."))
            })
    }
}

/// A spending record owned by one user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expenditure {
    pub id: Uuid,
    pub owner: Uuid,
    pub category: Category,
    pub name_of_item: String,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expenditure {
    pub fn new(
        owner: Uuid,
        category: Category,
        name_of_item: String,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            category,
            name_of_item,
            amount,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenditures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub name_of_item: String,
    pub amount_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expenditure> for ActiveModel {
    fn from(value: &Expenditure) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.owner.to_string()),
            category: ActiveValue::Set(value.category.as_str().to_string()),
            name_of_item: ActiveValue::Set(value.name_of_item.clone()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Expenditure {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expenditure")?,
            owner: parse_uuid(&model.user_id, "user")?,
            category: Category::try_from(model.category.as_str())?,
            name_of_item: model.name_of_item,
            amount: Amount::from_minor(model.amount_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
