use chrono::Duration;
use engine::{CredentialHasher, PasswordPolicy, SessionIssuer};
use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "moneta={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect(&settings.database_url()).await?;

    let hashing = &settings.hashing;
    let engine = engine::Engine::builder()
        .database(db)
        .sessions(SessionIssuer::new(
            settings.auth.secret.as_bytes(),
            Duration::minutes(settings.auth.access_ttl_minutes),
            Duration::minutes(settings.auth.refresh_ttl_minutes),
        ))
        .password_policy(PasswordPolicy::new(settings.password.min_length))
        .hasher(CredentialHasher::new(
            hashing.memory_kib,
            hashing.iterations,
            hashing.parallelism,
        )?)
        .build()
        .await?;

    if let Ok(flushed) = engine.flush_expired_tokens().await {
        tracing::debug!("flushed {flushed} expired blacklist records");
    }

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    server::run(engine, &addr).await;

    Ok(())
}

async fn connect(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
