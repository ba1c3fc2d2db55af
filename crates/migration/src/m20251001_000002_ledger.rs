//! Per-user ledger: `incomes` and `expenditures`.
//!
//! Amounts are integer minor units. Rows go away with their owner.

use sea_orm_migration::prelude::*;

use crate::m20251001_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    UserId,
    NameOfRevenue,
    AmountMinor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Expenditures {
    Table,
    Id,
    UserId,
    Category,
    NameOfItem,
    AmountMinor,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // Incomes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incomes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Incomes::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Incomes::NameOfRevenue)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Incomes::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Incomes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Incomes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-user_id")
                            .from(Incomes::Table, Incomes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, cols) in [
            ("idx-incomes-user_id", vec![Incomes::UserId]),
            ("idx-incomes-created_at", vec![Incomes::CreatedAt]),
            (
                "idx-incomes-user_id-created_at",
                vec![Incomes::UserId, Incomes::CreatedAt],
            ),
        ] {
            let mut index = Index::create();
            index.name(name).table(Incomes::Table);
            for col in cols {
                index.col(col);
            }
            manager.create_index(index.to_owned()).await?;
        }

        // ───────────────────────────────────────────────────────────────────
        // Expenditures
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenditures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenditures::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenditures::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Expenditures::Category)
                            .string_len(20)
                            .not_null()
                            .default("OTHER"),
                    )
                    .col(
                        ColumnDef::new(Expenditures::NameOfItem)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Expenditures::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Expenditures::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Expenditures::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenditures-user_id")
                            .from(Expenditures::Table, Expenditures::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, cols) in [
            ("idx-expenditures-user_id", vec![Expenditures::UserId]),
            ("idx-expenditures-category", vec![Expenditures::Category]),
            ("idx-expenditures-created_at", vec![Expenditures::CreatedAt]),
            (
                "idx-expenditures-user_id-category",
                vec![Expenditures::UserId, Expenditures::Category],
            ),
            (
                "idx-expenditures-user_id-created_at",
                vec![Expenditures::UserId, Expenditures::CreatedAt],
            ),
        ] {
            let mut index = Index::create();
            index.name(name).table(Expenditures::Table);
            for col in cols {
                index.col(col);
            }
            manager.create_index(index.to_owned()).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenditures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        Ok(())
    }
}
