#![allow(dead_code)]

use chrono::Duration;
use sea_orm::{Database, DatabaseConnection};

use engine::{CredentialHasher, Engine, Identity, SessionIssuer, SignupCmd, User};
use migration::MigratorTrait;

pub const STRONG_PASSWORD: &str = "StrongPass@123";

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .sessions(SessionIssuer::new(
            b"engine-test-secret",
            Duration::minutes(5),
            Duration::days(1),
        ))
        .hasher(CredentialHasher::new(8, 1, 1).unwrap())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn signup(engine: &Engine, name: &str) -> User {
    engine
        .signup(
            SignupCmd::new(
                format!("{name}@example.com"),
                name,
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            )
            .first_name("Test")
            .last_name("User"),
        )
        .await
        .unwrap()
}

pub fn identity(user: &User) -> Identity {
    Identity {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
    }
}
