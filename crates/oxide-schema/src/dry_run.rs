//! Dry-run gateway.
//!
//! Wraps a real connection: existence checks go to the database, but DDL
//! is recorded instead of executed. Planned tables and columns are kept in
//! an overlay so later checks in the same pass see them, which keeps the
//! recorded plan identical to what a real pass would execute.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;

use crate::dialect::{DdlDialect, DdlOp, DdlStatement};
use crate::gateway::{Connection, DatabaseError, DatabaseGateway};

#[derive(Debug, Default)]
struct Plan {
    tables: BTreeMap<String, BTreeSet<String>>,
    columns: BTreeSet<(String, String)>,
    statements: Vec<DdlStatement>,
}

/// A [`DatabaseGateway`] that records DDL instead of running it.
pub struct DryRunGateway {
    inner: Connection,
    plan: Mutex<Plan>,
}

impl DryRunGateway {
    /// Wraps `inner` for planning.
    #[must_use]
    pub fn new(inner: Connection) -> Self {
        Self {
            inner,
            plan: Mutex::new(Plan::default()),
        }
    }

    /// Statements that would have been executed, in order.
    #[must_use]
    pub fn statements(&self) -> Vec<DdlStatement> {
        self.plan().statements.clone()
    }

    fn plan(&self) -> MutexGuard<'_, Plan> {
        self.plan.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DatabaseGateway for DryRunGateway {
    fn dialect(&self) -> &dyn DdlDialect {
        self.inner.dialect()
    }

    fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, DatabaseError>> {
        Box::pin(async move {
            if self.plan().tables.contains_key(table) {
                return Ok(true);
            }
            self.inner.table_exists(table).await
        })
    }

    fn column_exists<'a>(
        &'a self,
        table: &'a str,
        column: &'a str,
    ) -> BoxFuture<'a, Result<bool, DatabaseError>> {
        Box::pin(async move {
            {
                let plan = self.plan();
                if let Some(columns) = plan.tables.get(table) {
                    return Ok(columns.contains(column));
                }
                if plan.columns.contains(&(table.to_string(), column.to_string())) {
                    return Ok(true);
                }
            }
            self.inner.column_exists(table, column).await
        })
    }

    fn execute<'a>(
        &'a self,
        statement: &'a DdlStatement,
    ) -> BoxFuture<'a, Result<(), DatabaseError>> {
        Box::pin(async move {
            let mut plan = self.plan();
            match &statement.op {
                DdlOp::CreateTable { table, columns, .. } => {
                    plan.tables
                        .insert(table.clone(), columns.iter().cloned().collect());
                }
                DdlOp::AddColumn { table, column } => {
                    if let Some(columns) = plan.tables.get_mut(table) {
                        columns.insert(column.clone());
                    } else {
                        plan.columns.insert((table.clone(), column.clone()));
                    }
                }
                DdlOp::AddForeignKey { .. } => {}
            }
            plan.statements.push(statement.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::column::ColumnType;
    use crate::memory::MemoryGateway;
    use crate::reconcile::reconcile;
    use crate::schema::SchemaBuilder;

    fn schema(columns: &[&str]) -> crate::schema::ModelSchema {
        let mut schema = SchemaBuilder::new("user");
        for name in columns {
            let column = schema.new_column(*name, ColumnType::Text);
            schema.register_column(column);
        }
        schema.build()
    }

    #[tokio::test]
    async fn test_fresh_table_plans_single_create() {
        let real = Arc::new(MemoryGateway::new());
        let dry = DryRunGateway::new(real.clone());

        reconcile(&dry, &schema(&["id", "name"])).await.unwrap();

        let planned = dry.statements();
        assert_eq!(planned.len(), 1);
        assert!(planned[0].sql.starts_with("CREATE TABLE"));
        assert!(!real.has_table("user"));
        assert!(real.statements().is_empty());
    }

    #[tokio::test]
    async fn test_existing_table_plans_missing_columns() {
        let real = Arc::new(MemoryGateway::new().with_table("user", &["id"]));
        let dry = DryRunGateway::new(real.clone());

        reconcile(&dry, &schema(&["id", "email"])).await.unwrap();

        let ops: Vec<DdlOp> = dry.statements().into_iter().map(|s| s.op).collect();
        assert_eq!(
            ops,
            vec![DdlOp::AddColumn {
                table: "user".into(),
                column: "email".into(),
            }]
        );
        assert_eq!(real.columns("user").unwrap(), vec!["id"]);
    }
}
