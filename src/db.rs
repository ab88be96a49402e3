//! Connection pool setup and schema migrations.
//!
//! The pool is a `sqlx::AnyPool`, so the same queries run against SQLite (the
//! default) and PostgreSQL. Queries use `$N` placeholders, which both backends
//! accept, and bind only integers and text.

use crate::error::AppError;
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::migrate::{MigrateDatabase, Migrator};
use sqlx::{Any, AnyPool};
use std::time::Duration;

static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");
static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");

/// Database engine selected by the `DATABASE_URL` scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn from_url(database_url: &str) -> Result<Self, AppError> {
        if database_url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else {
            let scheme = database_url.split(':').next().unwrap_or_default();
            Err(AppError::Configuration(format!(
                "Unsupported DATABASE_URL scheme '{}': use sqlite: or postgres://",
                scheme
            )))
        }
    }

    fn migrator(self) -> &'static Migrator {
        match self {
            Backend::Sqlite => &SQLITE_MIGRATOR,
            Backend::Postgres => &POSTGRES_MIGRATOR,
        }
    }
}

/// Opens a pool for `database_url`. A missing SQLite file is created first.
///
/// SQLite connections enforce foreign keys, which the schema's references and
/// `ON DELETE CASCADE` rely on.
pub async fn connect(database_url: &str) -> Result<AnyPool, AppError> {
    install_default_drivers();
    let backend = Backend::from_url(database_url)?;

    if backend == Backend::Sqlite && !Any::database_exists(database_url).await? {
        Any::create_database(database_url).await?;
    }

    // An in-memory database lives and dies with its connection.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &AnyPool, backend: Backend) -> Result<(), AppError> {
    backend.migrator().run(pool).await?;
    Ok(())
}

/// Connects and brings the schema up to date.
pub async fn init(database_url: &str) -> Result<AnyPool, AppError> {
    let backend = Backend::from_url(database_url)?;
    let pool = connect(database_url).await?;
    migrate(&pool, backend).await?;
    log::info!("Database ready ({:?})", backend);
    Ok(pool)
}
