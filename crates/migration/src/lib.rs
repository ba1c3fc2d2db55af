pub use sea_orm_migration::prelude::*;

mod m20251001_000001_users;
mod m20251001_000002_ledger;
mod m20251001_000003_token_blacklist;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_users::Migration),
            Box::new(m20251001_000002_ledger::Migration),
            Box::new(m20251001_000003_token_blacklist::Migration),
        ]
    }
}
