use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use uuid::Uuid;

use novel_nest::authz::{PolicyTable, Role};
use novel_nest::db;
use novel_nest::utils::{hash_password, normalize_email, utc_now};

#[derive(Parser, Debug)]
#[command(author, version, about = "novel-nest ops tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Migration housekeeping
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Create an account directly, e.g. to bootstrap the first admin
    CreateUser {
        name: String,
        email: String,
        password: String,
        /// Raw role value; unknown spellings floor to reader
        #[arg(long, default_value = "reader")]
        role: String,
    },
    /// Print the route-policy table the gate enforces
    Policies,
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Create an empty migration file
    New { name: String },
    /// Apply pending migrations
    Run,
    /// List applied and pending migrations
    Status,
    /// Undo the most recent migration
    Rollback,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The binary may run from outside the repo root (containers); fall back
    // to the crate-local .env when the CWD has none.
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path(Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));
    }

    match Cli::parse().command {
        Commands::Migrate(MigrateCommand::New { name }) => {
            let path = new_migration(&name)?;
            println!("created {}", path.display());
        }
        Commands::Migrate(MigrateCommand::Run) => {
            let pool = open_pool().await?;
            load_migrator().await?.run(&pool).await?;
            println!("migrations applied");
        }
        Commands::Migrate(MigrateCommand::Status) => {
            let pool = open_pool().await?;
            let migrator = load_migrator().await?;
            print_status(&pool, &migrator).await?;
        }
        Commands::Migrate(MigrateCommand::Rollback) => {
            let pool = open_pool().await?;
            load_migrator()
                .await?
                .undo(&pool, 1)
                .await
                .context("nothing to roll back")?;
            println!("rolled back last migration");
        }
        Commands::CreateUser { name, email, password, role } => {
            let pool = open_pool().await?;
            let role = Role::normalize_user(Some(&role));
            let email = normalize_email(&email);
            create_user(&pool, &name, &email, &password, role).await?;
            println!("created {} with role {}", email, role);
        }
        Commands::Policies => {
            let table = PolicyTable::deployment();
            println!("{:<8} {:<6} {:<12} prefix", "surface", "exact", "min-role");
            for rule in table.rules() {
                println!(
                    "{:<8} {:<6} {:<12} {}",
                    rule.surface.as_str(),
                    rule.exact,
                    rule.min_role.as_str(),
                    rule.prefix
                );
            }
        }
    }

    Ok(())
}

async fn open_pool() -> anyhow::Result<SqlitePool> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    db::connect(&url).await
}

/// Prefers ./migrations so `cargo run` from the repo root picks up fresh
/// files; falls back to the crate directory otherwise.
async fn load_migrator() -> anyhow::Result<sqlx::migrate::Migrator> {
    let local = Path::new("migrations");
    let dir = if local.is_dir() {
        local.to_path_buf()
    } else {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
    };

    sqlx::migrate::Migrator::new(dir.clone())
        .await
        .with_context(|| format!("failed to load migrations from {}", dir.display()))
}

fn new_migration(name: &str) -> anyhow::Result<PathBuf> {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let stamp = utc_now().format("%Y%m%d%H%M%S");
    let path = Path::new("migrations").join(format!("{stamp}_{slug}.sql"));

    if path.exists() {
        anyhow::bail!("migration already exists: {}", path.display());
    }
    fs::write(&path, "-- migration SQL\n")
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path)
}

async fn print_status(pool: &SqlitePool, migrator: &sqlx::migrate::Migrator) -> anyhow::Result<()> {
    // A missing bookkeeping table just means nothing has run yet
    let applied: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await
            .unwrap_or_default();

    println!("{:<8} {:<16} name", "status", "version");
    for migration in migrator.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        println!(
            "{:<8} {:<16} {}",
            state,
            migration.version,
            migration.description.as_ref()
        );
    }

    Ok(())
}

async fn create_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<()> {
    let taken: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE email = ? AND deleted_at IS NULL")
            .bind(email)
            .fetch_one(pool)
            .await?;
    if taken > 0 {
        anyhow::bail!("email already in use: {email}");
    }

    let password_hash = hash_password(password).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    let now = utc_now();

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
