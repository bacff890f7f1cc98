//! Additive schema reconciliation.
//!
//! Diffs a [`ModelSchema`] against the live catalog and applies only what
//! is missing:
//!
//! 1. create the table if it does not exist,
//! 2. add every declared column the table lacks,
//! 3. add every foreign key, treating "already exists" as success.
//!
//! Dialects without `ADD CONSTRAINT` declare foreign keys inside the
//! `CREATE TABLE` instead; on such a dialect a table that already exists
//! keeps the constraints it was created with.
//!
//! Existing columns are never compared or altered, and nothing is ever
//! dropped. Every step is individually idempotent, so a pass interrupted
//! halfway can simply be run again.

use tracing::{debug, info, warn};

use crate::dialect::DdlStatement;
use crate::error::{ReconcileError, Result, SchemaObject};
use crate::gateway::{DatabaseErrorKind, DatabaseGateway};
use crate::schema::ModelSchema;

/// Reconciles the live schema of `schema.table()` with its declaration.
pub async fn reconcile(gateway: &dyn DatabaseGateway, schema: &ModelSchema) -> Result<()> {
    schema.validate()?;

    let dialect = gateway.dialect();
    let table = schema.table();

    let table_exists = gateway
        .table_exists(table)
        .await
        .map_err(|source| ReconcileError::Schema {
            object: SchemaObject::Table(table.to_string()),
            source,
        })?;

    if !table_exists {
        let statement = dialect.create_table(table, schema.columns(), schema.foreign_keys());
        info!(table = %table, columns = schema.columns().len(), "Creating table");
        execute(gateway, &statement, || SchemaObject::Table(table.to_string())).await?;
    }

    for column in schema.columns() {
        let object = || SchemaObject::Column {
            table: table.to_string(),
            column: column.name().to_string(),
        };
        let exists = gateway
            .column_exists(table, column.name())
            .await
            .map_err(|source| ReconcileError::Schema {
                object: object(),
                source,
            })?;
        if exists {
            continue;
        }
        let statement = dialect.add_column(table, column);
        info!(table = %table, column = %column.name(), "Adding column");
        execute(gateway, &statement, object).await?;
    }

    if !table_exists && !dialect.supports_add_constraint() {
        debug!(
            table = %table,
            foreign_keys = schema.foreign_keys().len(),
            "Foreign keys declared with the table"
        );
        return Ok(());
    }

    for fk in schema.foreign_keys() {
        let Some(statement) = dialect.add_foreign_key(fk) else {
            warn!(
                table = %table,
                constraint = %fk.constraint_name(),
                dialect = dialect.name(),
                "Dialect cannot add constraints to existing tables, skipping foreign key"
            );
            continue;
        };
        debug!(sql = %statement.sql, "Executing SQL");
        match gateway.execute(&statement).await {
            Ok(()) => {}
            Err(e) if e.kind() == DatabaseErrorKind::AlreadyExists => {
                debug!(
                    table = %table,
                    constraint = %fk.constraint_name(),
                    "Foreign key already exists"
                );
            }
            Err(source) => {
                return Err(ReconcileError::Schema {
                    object: SchemaObject::ForeignKey {
                        table: table.to_string(),
                        constraint: fk.constraint_name(),
                    },
                    source,
                });
            }
        }
    }

    Ok(())
}

async fn execute(
    gateway: &dyn DatabaseGateway,
    statement: &DdlStatement,
    object: impl FnOnce() -> SchemaObject,
) -> Result<()> {
    debug!(sql = %statement.sql, "Executing SQL");
    gateway
        .execute(statement)
        .await
        .map_err(|source| ReconcileError::Schema {
            object: object(),
            source,
        })
}
