//! Runtime settings, read from `settings.toml` (or the file named by
//! `MONETA_CONFIG`) and overridden by `MONETA__SECTION__KEY` environment
//! variables.
//!
//! See `settings.example.toml` for every key.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            database: Database::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_minutes: i64,
}

fn default_access_ttl() -> i64 {
    5
}

fn default_refresh_ttl() -> i64 {
    24 * 60
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Password {
    pub min_length: usize,
}

impl Default for Password {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hashing {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Hashing {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    pub auth: Auth,
    #[serde(default)]
    pub password: Password,
    #[serde(default)]
    pub hashing: Hashing,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var("MONETA_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("MONETA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn database_url(&self) -> String {
        match &self.server.database {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}
