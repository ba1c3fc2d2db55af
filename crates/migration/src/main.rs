use clap::{Parser, Subcommand};
use sea_orm::Database;
use sea_orm_migration::prelude::*;

/// Apply or inspect the moneta schema.
#[derive(Parser, Debug)]
#[command(name = "migration")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./moneta.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Option<Step>,
}

#[derive(Subcommand, Debug)]
enum Step {
    /// Apply pending migrations (all of them by default).
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations (the last one by default).
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Drop every table and re-apply from scratch.
    Fresh,
    /// Roll back everything.
    Reset,
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.command.unwrap_or(Step::Up { steps: None }) {
        Step::Up { steps } => migration::Migrator::up(&db, steps).await?,
        Step::Down { steps } => migration::Migrator::down(&db, Some(steps)).await?,
        Step::Fresh => migration::Migrator::fresh(&db).await?,
        Step::Reset => migration::Migrator::reset(&db).await?,
        Step::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
