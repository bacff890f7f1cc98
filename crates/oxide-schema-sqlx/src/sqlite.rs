//! SQLite gateway.

use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use oxide_schema::{
    Connection, DatabaseError, DatabaseErrorKind, DatabaseGateway, DdlDialect, DdlStatement,
    SqliteDialect,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::{other_error, GatewayOptions};

/// A [`DatabaseGateway`] over a SQLite pool.
///
/// SQLite cannot add foreign keys to existing tables, so declared foreign
/// keys are created with the table; a table that already exists keeps the
/// constraints it has.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
    dialect: SqliteDialect,
}

impl SqliteGateway {
    /// Connects to `url` with default options.
    pub async fn connect(url: &str) -> Result<Self, DatabaseError> {
        Self::connect_with(url, GatewayOptions::default()).await
    }

    /// Connects to `url`, creating the database file if missing and
    /// enabling foreign-key enforcement.
    pub async fn connect_with(url: &str, options: GatewayOptions) -> Result<Self, DatabaseError> {
        let connect = SqliteConnectOptions::from_str(url)
            .map_err(|e| classify(&e))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect)
            .await
            .map_err(|e| classify(&e))?;
        debug!(url = %url, "Connected to SQLite");
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            dialect: SqliteDialect::new(),
        }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wraps the gateway in a shareable [`Connection`].
    #[must_use]
    pub fn into_connection(self) -> Connection {
        Arc::new(self)
    }
}

impl DatabaseGateway for SqliteGateway {
    fn dialect(&self) -> &dyn DdlDialect {
        &self.dialect
    }

    fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, DatabaseError>> {
        Box::pin(async move {
            let row = sqlx::query("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| classify(&e))?;
            Ok(row.is_some())
        })
    }

    fn column_exists<'a>(
        &'a self,
        table: &'a str,
        column: &'a str,
    ) -> BoxFuture<'a, Result<bool, DatabaseError>> {
        Box::pin(async move {
            let row = sqlx::query("SELECT 1 FROM pragma_table_info(?) WHERE name = ?")
                .bind(table)
                .bind(column)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| classify(&e))?;
            Ok(row.is_some())
        })
    }

    fn execute<'a>(
        &'a self,
        statement: &'a DdlStatement,
    ) -> BoxFuture<'a, Result<(), DatabaseError>> {
        Box::pin(async move {
            sqlx::query(&statement.sql)
                .execute(&self.pool)
                .await
                .map_err(|e| classify(&e))?;
            Ok(())
        })
    }
}

/// Classifies a SQLite error.
///
/// SQLite reports schema conflicts with the generic `SQLITE_ERROR` code,
/// so the message is the only thing that distinguishes them.
pub(crate) fn classify(err: &sqlx::Error) -> DatabaseError {
    let sqlx::Error::Database(db) = err else {
        return other_error(err);
    };
    let message = db.message();
    let kind = if message.contains("already exists") || message.starts_with("duplicate column name")
    {
        DatabaseErrorKind::AlreadyExists
    } else {
        DatabaseErrorKind::Other
    };
    let error = DatabaseError::new(kind, message);
    match db.code() {
        Some(code) => error.with_code(code),
        None => error,
    }
}
