use std::{error::Error, io::Write};

use chrono::Duration;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, PasswordPolicy, SessionIssuer, SignupCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "moneta_admin")]
#[command(about = "Admin utilities for Moneta (bootstrap users, token housekeeping)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./moneta.db?mode=rwc")]
    database_url: String,

    /// Token signing secret; must match the server's `auth.secret`.
    #[arg(long, env = "MONETA__AUTH__SECRET", hide_env_values = true)]
    auth_secret: String,

    #[arg(long, env = "MONETA__PASSWORD__MIN_LENGTH", default_value_t = 8)]
    password_min_length: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Token(Token),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account; the password is prompted for.
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
}

#[derive(Args, Debug)]
struct Token {
    #[command(subcommand)]
    command: TokenCommand,
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Delete blacklist records whose token has already expired.
    Flush,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Prompt until the two entries pass the password policy together.
fn prompt_password_twice(
    policy: &PasswordPolicy,
) -> Result<(String, String), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let password = prompt_password("Password: ")?;
        let confirm = prompt_password("Confirm password: ")?;
        let Err(errors) = policy.validate(&password, &confirm) else {
            return Ok((password, confirm));
        };

        for field in errors.fields() {
            for message in errors.get(field) {
                execute!(out, Print(format!("{field}: {message}\r\n")))?;
            }
        }
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db)
        .sessions(SessionIssuer::new(
            cli.auth_secret.as_bytes(),
            Duration::minutes(5),
            Duration::days(1),
        ))
        .password_policy(PasswordPolicy::new(cli.password_min_length))
        .build()
        .await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let (password, confirm) = prompt_password_twice(engine.password_policy())?;
            let cmd = SignupCmd::new(args.email, args.username, password, confirm)
                .first_name(args.first_name)
                .last_name(args.last_name);

            match engine.signup(cmd).await {
                Ok(user) => println!("created user: {} ({})", user.username, user.id),
                Err(EngineError::Validation(errors)) => {
                    eprintln!("{errors}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in engine.users().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.id,
                    user.username,
                    user.email,
                    user.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Token(Token {
            command: TokenCommand::Flush,
        }) => {
            let flushed = engine.flush_expired_tokens().await?;
            println!("flushed {flushed} expired blacklist records");
        }
    }

    Ok(())
}
