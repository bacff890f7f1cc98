//! The database gateway contract.
//!
//! The reconciler never talks to a driver directly. It asks a
//! [`DatabaseGateway`] whether tables and columns exist, and hands it
//! [`DdlStatement`]s built by the gateway's own [`DdlDialect`]. Driver
//! crates (oxide-schema-sqlx) implement the trait for real connection
//! pools; [`MemoryGateway`](crate::memory::MemoryGateway) and
//! [`DryRunGateway`](crate::dry_run::DryRunGateway) live here.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::dialect::{DdlDialect, DdlStatement};

/// Coarse classification of a driver error.
///
/// Drivers map their native error codes into these kinds so the
/// reconciler never has to inspect error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseErrorKind {
    /// The object being created already exists.
    AlreadyExists,
    /// A referenced table or column does not exist.
    MissingReference,
    /// Anything else.
    Other,
}

/// A failure reported by a [`DatabaseGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    kind: DatabaseErrorKind,
    code: Option<String>,
    message: String,
}

impl DatabaseError {
    /// Creates a new error of the given kind.
    pub fn new(kind: DatabaseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    /// Attaches the driver's native error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns the error classification.
    #[must_use]
    pub fn kind(&self) -> DatabaseErrorKind {
        self.kind
    }

    /// Returns the driver's native error code, if it reported one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the driver's error text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DatabaseError {}

/// Schema introspection and DDL execution against one database.
///
/// Async methods return boxed futures so the trait stays object safe and
/// a single [`Connection`] can be shared by every model in the process.
pub trait DatabaseGateway: Send + Sync {
    /// The DDL dialect statements for this database are built with.
    fn dialect(&self) -> &dyn DdlDialect;

    /// Returns whether `table` exists.
    fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, DatabaseError>>;

    /// Returns whether `table` has a column named `column`.
    fn column_exists<'a>(
        &'a self,
        table: &'a str,
        column: &'a str,
    ) -> BoxFuture<'a, Result<bool, DatabaseError>>;

    /// Executes a single DDL statement.
    fn execute<'a>(&'a self, statement: &'a DdlStatement)
        -> BoxFuture<'a, Result<(), DatabaseError>>;
}

/// A shared handle to a database gateway.
pub type Connection = Arc<dyn DatabaseGateway>;
