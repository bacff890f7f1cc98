//! Error types for schema reconciliation.

use std::fmt;

use crate::gateway::{DatabaseError, DatabaseErrorKind};

/// The schema object a failed statement was targeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaObject {
    /// A whole table (`CREATE TABLE`).
    Table(String),
    /// A single column (`ADD COLUMN`).
    Column {
        /// Owning table.
        table: String,
        /// Column name.
        column: String,
    },
    /// A foreign-key constraint (`ADD CONSTRAINT`).
    ForeignKey {
        /// Table carrying the constraint.
        table: String,
        /// Constraint name.
        constraint: String,
    },
}

impl fmt::Display for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(table) => write!(f, "table '{table}'"),
            Self::Column { table, column } => write!(f, "column '{table}.{column}'"),
            Self::ForeignKey { table, constraint } => {
                write!(f, "foreign key '{constraint}' on table '{table}'")
            }
        }
    }
}

/// Errors that can occur while initializing a model.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Neither an explicit nor a default connection was available.
    #[error("No database connection available to initialize model '{model}'")]
    Configuration {
        /// Type name of the model being initialized.
        model: String,
    },

    /// A DDL statement failed against the database.
    #[error("Schema error on {object}: {source}")]
    Schema {
        /// What the statement was creating.
        object: SchemaObject,
        /// The underlying database failure.
        #[source]
        source: DatabaseError,
    },

    /// A declared descriptor cannot produce valid DDL.
    #[error("Invalid descriptor for table '{table}': {message}")]
    InvalidDescriptor {
        /// Declaring table (may be empty if that is the problem).
        table: String,
        /// What is wrong with it.
        message: String,
    },

    /// Reconciliation was cancelled or ran past its deadline.
    #[error("Reconciliation of table '{table}' was cancelled")]
    Cancelled {
        /// Table whose reconciliation did not complete.
        table: String,
    },

    /// Models reference each other in a cycle.
    #[error("Circular foreign-key dependency between tables: {}", .tables.join(", "))]
    CircularDependency {
        /// Tables participating in (or blocked by) the cycle.
        tables: Vec<String>,
    },
}

impl ReconcileError {
    /// Returns the underlying database error, if any.
    #[must_use]
    pub fn database_error(&self) -> Option<&DatabaseError> {
        match self {
            Self::Schema { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns whether the failure was a missing referenced table/column.
    #[must_use]
    pub fn is_referential(&self) -> bool {
        self.database_error()
            .is_some_and(|e| e.kind() == DatabaseErrorKind::MissingReference)
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
