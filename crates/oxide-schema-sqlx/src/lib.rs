//! sqlx-backed gateways for `oxide-schema`.
//!
//! Each gateway wraps a sqlx connection pool, answers the reconciler's
//! existence checks from the engine's catalog and executes the DDL it is
//! handed. Driver errors are classified into
//! [`DatabaseErrorKind`](oxide_schema::DatabaseErrorKind) from native
//! error codes.
//!
//! ```rust,ignore
//! use oxide_schema::prelude::*;
//! use oxide_schema_sqlx::SqliteGateway;
//!
//! let conn = SqliteGateway::connect("sqlite:app.db").await?.into_connection();
//! User::init(Some(&conn)).await?;
//! ```

use std::time::Duration;

#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::MySqlGateway;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteGateway;

use oxide_schema::{DatabaseError, DatabaseErrorKind};

/// Connection pool settings shared by every gateway.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayOptions {
    /// Sets the maximum number of pooled connections.
    #[must_use]
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the connection acquire timeout.
    #[must_use]
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Converts a non-database sqlx error; database errors are classified by
/// the per-engine modules.
fn other_error(err: &sqlx::Error) -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::Other, err.to_string())
}
