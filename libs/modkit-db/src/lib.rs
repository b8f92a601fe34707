//! Database access layer for the catalog workspace.
//!
//! The crate wraps a pooled sqlx connection (SQLite or PostgreSQL) behind a
//! SeaORM [`DatabaseConnection`] and adds three things on top:
//! - [`DbHandle`]: engine detection, pool setup and graceful close.
//! - [`repo::Repository`]: a generic CRUD repository over any SeaORM entity,
//!   with an explicit optional transaction handle on every call.
//! - [`errors`]: classification of raw storage errors into
//!   not-found / conflict / unknown ([`RepoError`]).
//!
//! # Example
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> modkit_db::Result<()> {
//!     use modkit_db::{ConnectOpts, DbHandle};
//!
//!     let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//!     let conn = db.sea();
//!     // build repositories on top of `conn`
//!     # drop(conn);
//!     db.close().await;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod repo;
pub mod transaction;

pub use errors::{RepoError, RepoResult};
pub use repo::{Filter, Repository};
pub use transaction::with_transaction;

use std::time::Duration;

#[cfg(feature = "pg")]
use sqlx::postgres::{PgPool, PgPoolOptions};
#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use sea_orm::DatabaseConnection;
#[cfg(feature = "pg")]
use sea_orm::SqlxPostgresConnector;
#[cfg(feature = "sqlite")]
use sea_orm::SqlxSqliteConnector;

use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for connection setup.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Connection options; each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Minimum number of connections in the pool.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    pub idle_timeout: Option<Duration>,
    /// SQLite busy timeout.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            sqlite_busy_timeout: Some(Duration::from_millis(DEFAULT_SQLITE_BUSY_TIMEOUT_MS)),
            create_sqlite_dirs: true,
        }
    }
}

/// One concrete sqlx pool.
#[derive(Clone, Debug)]
pub enum DbPool {
    #[cfg(feature = "pg")]
    Postgres(PgPool),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

/// Main handle: owns the pool and the SeaORM connection built on top of it.
#[derive(Debug)]
pub struct DbHandle {
    engine: DbEngine,
    pool: DbPool,
    dsn: String,
    sea: DatabaseConnection,
}

const DEFAULT_SQLITE_BUSY_TIMEOUT_MS: u64 = 5000;

impl DbHandle {
    /// Detect engine by DSN scheme. The tail (credentials etc.) is not touched.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(Some(dsn))))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        match engine {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(n) = opts.min_conns {
                    o = o.min_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                o = o.idle_timeout(opts.idle_timeout);
                let pool = o.connect(dsn).await?;
                let sea = SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone());
                Ok(Self {
                    engine,
                    pool: DbPool::Postgres(pool),
                    dsn: dsn.to_string(),
                    sea,
                })
            }
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => {
                use std::str::FromStr;

                let in_memory = is_sqlite_memory(dsn);
                if !in_memory {
                    prepare_sqlite_path(dsn, opts.create_sqlite_dirs)?;
                }

                let mut connect = SqliteConnectOptions::from_str(dsn)?
                    .create_if_missing(true)
                    .foreign_keys(true);
                if let Some(t) = opts.sqlite_busy_timeout {
                    connect = connect.busy_timeout(t);
                }

                let mut o = SqlitePoolOptions::new();
                if in_memory {
                    // Every connection to `:memory:` is a separate database, so the
                    // pool must hold exactly one connection and never recycle it.
                    o = o
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                } else {
                    if let Some(n) = opts.max_conns {
                        o = o.max_connections(n);
                    }
                    if let Some(n) = opts.min_conns {
                        o = o.min_connections(n);
                    }
                    o = o.idle_timeout(opts.idle_timeout);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }

                let pool = o.connect_with(connect).await?;
                let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
                Ok(Self {
                    engine,
                    pool: DbPool::Sqlite(pool),
                    dsn: dsn.to_string(),
                    sea,
                })
            }
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => Err(DbError::FeatureDisabled("PostgreSQL feature not enabled")),
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => Err(DbError::FeatureDisabled("SQLite feature not enabled")),
        }
    }

    /// Graceful pool close. (Dropping the pool also closes it; this just makes it explicit.)
    pub async fn close(self) {
        match self.pool {
            #[cfg(feature = "pg")]
            DbPool::Postgres(p) => p.close().await,
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(p) => p.close().await,
        }
    }

    /// Get the backend.
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Get the DSN used for this connection.
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Get SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    /// Borrow the SeaORM connection, e.g. for running migrations.
    pub fn seaorm(&self) -> &DatabaseConnection {
        &self.sea
    }
}

// ===================== helpers =====================

fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

#[cfg(feature = "sqlite")]
fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> Result<()> {
    if !create_dirs {
        return Ok(());
    }

    let raw = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);
    let path = raw.split('?').next().unwrap_or(raw);

    if !path.starts_with("file:") {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                // One-time blocking call during startup.
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

/// Replace the password in a DSN with `***` so it can be logged.
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    match dsn {
        Some(dsn) if dsn.contains('@') => {
            if let Ok(mut parsed) = url::Url::parse(dsn) {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            } else {
                "***".to_string()
            }
        }
        Some(dsn) => dsn.to_string(),
        None => "none".to_string(),
    }
}
