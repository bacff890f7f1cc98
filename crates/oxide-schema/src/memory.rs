//! In-memory gateway.
//!
//! [`MemoryGateway`] keeps a catalog of tables, columns and constraint
//! names and applies [`DdlStatement`]s structurally, without parsing SQL.
//! It rejects the same things a real engine would (duplicate tables,
//! duplicate columns, dangling references, duplicate constraint names),
//! records every statement it is handed, and can be told to fail the next
//! one. Each call yields to the scheduler first, so concurrent callers
//! interleave the way they would against a real database.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;

use crate::dialect::{DdlDialect, DdlOp, DdlStatement, MySqlDialect};
use crate::gateway::{DatabaseError, DatabaseErrorKind, DatabaseGateway};

#[derive(Debug, Default)]
struct Catalog {
    tables: BTreeMap<String, Vec<String>>,
    constraints: BTreeSet<String>,
    log: Vec<DdlStatement>,
    failures: VecDeque<DatabaseError>,
}

impl Catalog {
    fn apply(&mut self, op: &DdlOp) -> Result<(), DatabaseError> {
        match op {
            DdlOp::CreateTable {
                table,
                columns,
                constraints,
            } => {
                if self.tables.contains_key(table) {
                    return Err(DatabaseError::new(
                        DatabaseErrorKind::AlreadyExists,
                        format!("table '{table}' already exists"),
                    ));
                }
                self.tables.insert(table.clone(), columns.clone());
                self.constraints.extend(constraints.iter().cloned());
            }
            DdlOp::AddColumn { table, column } => {
                let columns = self.tables.get_mut(table).ok_or_else(|| {
                    DatabaseError::new(DatabaseErrorKind::Other, format!("no such table: {table}"))
                })?;
                if columns.contains(column) {
                    return Err(DatabaseError::new(
                        DatabaseErrorKind::AlreadyExists,
                        format!("duplicate column name: {column}"),
                    ));
                }
                columns.push(column.clone());
            }
            DdlOp::AddForeignKey {
                table,
                constraint,
                column,
                referenced_table,
                referenced_column,
            } => {
                if self.constraints.contains(constraint) {
                    return Err(DatabaseError::new(
                        DatabaseErrorKind::AlreadyExists,
                        format!("constraint '{constraint}' already exists"),
                    ));
                }
                if !self.has_column(table, column) {
                    return Err(DatabaseError::new(
                        DatabaseErrorKind::Other,
                        format!("key column '{column}' doesn't exist in table '{table}'"),
                    ));
                }
                if !self.has_column(referenced_table, referenced_column) {
                    return Err(DatabaseError::new(
                        DatabaseErrorKind::MissingReference,
                        format!(
                            "failed to open the referenced table '{referenced_table}' \
                             or column '{referenced_column}'"
                        ),
                    ));
                }
                self.constraints.insert(constraint.clone());
            }
        }
        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .is_some_and(|columns| columns.iter().any(|c| c == column))
    }
}

/// A [`DatabaseGateway`] backed by an in-process catalog.
pub struct MemoryGateway {
    dialect: Box<dyn DdlDialect>,
    catalog: Mutex<Catalog>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// Creates an empty catalog that renders SQL with [`MySqlDialect`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_dialect(MySqlDialect::new())
    }

    /// Creates an empty catalog that renders SQL with `dialect`.
    #[must_use]
    pub fn with_dialect(dialect: impl DdlDialect + 'static) -> Self {
        Self {
            dialect: Box::new(dialect),
            catalog: Mutex::new(Catalog::default()),
        }
    }

    /// Seeds an existing table, as if created by an earlier deployment.
    #[must_use]
    pub fn with_table(self, table: &str, columns: &[&str]) -> Self {
        self.catalog().tables.insert(
            table.to_string(),
            columns.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Makes the next [`execute`](DatabaseGateway::execute) call fail
    /// with `error`. Queued failures are consumed in order.
    pub fn fail_next(&self, error: DatabaseError) {
        self.catalog().failures.push_back(error);
    }

    /// Every statement handed to `execute`, including rejected ones.
    #[must_use]
    pub fn statements(&self) -> Vec<DdlStatement> {
        self.catalog().log.clone()
    }

    /// The structured ops of [`statements`](Self::statements).
    #[must_use]
    pub fn ops(&self) -> Vec<DdlOp> {
        self.catalog().log.iter().map(|s| s.op.clone()).collect()
    }

    /// Forgets recorded statements. The catalog is kept.
    pub fn clear_log(&self) {
        self.catalog().log.clear();
    }

    /// Returns whether `table` exists.
    #[must_use]
    pub fn has_table(&self, table: &str) -> bool {
        self.catalog().tables.contains_key(table)
    }

    /// Columns of `table`, in creation order.
    #[must_use]
    pub fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.catalog().tables.get(table).cloned()
    }

    /// Returns whether a constraint named `name` exists.
    #[must_use]
    pub fn has_constraint(&self, name: &str) -> bool {
        self.catalog().constraints.contains(name)
    }

    fn catalog(&self) -> MutexGuard<'_, Catalog> {
        self.catalog.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DatabaseGateway for MemoryGateway {
    fn dialect(&self) -> &dyn DdlDialect {
        self.dialect.as_ref()
    }

    fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, DatabaseError>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            Ok(self.has_table(table))
        })
    }

    fn column_exists<'a>(
        &'a self,
        table: &'a str,
        column: &'a str,
    ) -> BoxFuture<'a, Result<bool, DatabaseError>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            Ok(self.catalog().has_column(table, column))
        })
    }

    fn execute<'a>(
        &'a self,
        statement: &'a DdlStatement,
    ) -> BoxFuture<'a, Result<(), DatabaseError>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let mut catalog = self.catalog();
            catalog.log.push(statement.clone());
            if let Some(error) = catalog.failures.pop_front() {
                return Err(error);
            }
            catalog.apply(&statement.op)
        })
    }
}
