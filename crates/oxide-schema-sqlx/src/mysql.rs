//! MySQL gateway.

use std::sync::Arc;

use futures::future::BoxFuture;
use oxide_schema::{
    Connection, DatabaseError, DatabaseErrorKind, DatabaseGateway, DdlDialect, DdlStatement,
    MySqlDialect,
};
use sqlx::mysql::{MySqlDatabaseError, MySqlPool, MySqlPoolOptions};
use tracing::debug;

use crate::{other_error, GatewayOptions};

/// `ER_TABLE_EXISTS_ERROR`, `ER_DUP_FIELDNAME`, `ER_DUP_KEYNAME`,
/// `ER_DUP_KEY`, `ER_FK_DUP_NAME`.
const ALREADY_EXISTS: &[u16] = &[1050, 1060, 1061, 1022, 1826];

/// `ER_FK_NO_INDEX_PARENT`, `ER_FK_CANNOT_OPEN_PARENT`.
///
/// `ER_CANNOT_ADD_FOREIGN` (1215) is left out: it also covers column type
/// and charset mismatches.
const MISSING_REFERENCE: &[u16] = &[1822, 1824];

/// A [`DatabaseGateway`] over a MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlGateway {
    pool: MySqlPool,
    dialect: MySqlDialect,
}

impl MySqlGateway {
    /// Connects to `url` with default options.
    pub async fn connect(url: &str) -> Result<Self, DatabaseError> {
        Self::connect_with(url, GatewayOptions::default()).await
    }

    /// Connects to `url`.
    pub async fn connect_with(url: &str, options: GatewayOptions) -> Result<Self, DatabaseError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| classify(&e))?;
        debug!("Connected to MySQL");
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self {
            pool,
            dialect: MySqlDialect::new(),
        }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Wraps the gateway in a shareable [`Connection`].
    #[must_use]
    pub fn into_connection(self) -> Connection {
        Arc::new(self)
    }
}

impl DatabaseGateway for MySqlGateway {
    fn dialect(&self) -> &dyn DdlDialect {
        &self.dialect
    }

    fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, DatabaseError>> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT 1 FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
            )
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
            let row = sqlx::query(
                "SELECT 1 FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?",
            )
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

/// Classifies a MySQL error by its server error number.
fn classify(err: &sqlx::Error) -> DatabaseError {
    let sqlx::Error::Database(db) = err else {
        return other_error(err);
    };
    let Some(number) = db.try_downcast_ref::<MySqlDatabaseError>().map(MySqlDatabaseError::number)
    else {
        return DatabaseError::new(DatabaseErrorKind::Other, db.message());
    };
    DatabaseError::new(kind_of(number), db.message()).with_code(number.to_string())
}

fn kind_of(number: u16) -> DatabaseErrorKind {
    if ALREADY_EXISTS.contains(&number) {
        DatabaseErrorKind::AlreadyExists
    } else if MISSING_REFERENCE.contains(&number) {
        DatabaseErrorKind::MissingReference
    } else {
        DatabaseErrorKind::Other
    }
}
