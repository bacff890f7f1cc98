//! oxide-schema command-line support.
//!
//! The binary is a thin wrapper; planning and status reporting live here
//! so they can run against any [`Connection`].

pub mod models;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use oxide_schema::{
    Connection, DatabaseError, DdlStatement, DryRunGateway, ModelSchema, ModelSet,
    ReconcileError, SchemaRegistry,
};
use serde::Serialize;
use tokio::time::error::Elapsed;
use tracing::info;

/// Live state of one model's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub table: String,
    pub exists: bool,
    /// Declared columns missing from the database. Empty when the table
    /// itself is missing.
    pub missing_columns: Vec<String>,
}

impl TableStatus {
    /// Returns whether the table matches its declaration.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.exists && self.missing_columns.is_empty()
    }
}

/// Reconciles every model in `set`, referenced tables first.
pub async fn sync(
    set: &ModelSet,
    registry: &SchemaRegistry,
    connection: &Connection,
) -> Result<(), ReconcileError> {
    set.init_in(registry, Some(connection)).await?;
    info!(models = set.len(), "Schema in sync");
    Ok(())
}

/// Runs `pass` under an optional deadline.
///
/// A pass that overruns is dropped; models it had not finished stay
/// uninitialized.
pub async fn with_deadline<T>(
    limit: Option<Duration>,
    pass: impl Future<Output = T>,
) -> Result<T, Elapsed> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, pass).await,
        None => Ok(pass.await),
    }
}

/// Returns the DDL a [`sync`] would execute, without executing it.
///
/// Foreign keys cannot be checked before they are added, so every declared
/// constraint appears in the plan.
pub async fn plan(
    set: &ModelSet,
    connection: &Connection,
) -> Result<Vec<DdlStatement>, ReconcileError> {
    let dry = Arc::new(DryRunGateway::new(Arc::clone(connection)));
    let planning: Connection = dry.clone();
    set.init_in(&SchemaRegistry::new(), Some(&planning)).await?;
    Ok(dry.statements())
}

/// Compares every model in `set` with the live database.
pub async fn status(
    set: &ModelSet,
    registry: &SchemaRegistry,
    connection: &Connection,
) -> Result<Vec<TableStatus>, DatabaseError> {
    let mut report = Vec::with_capacity(set.len());
    for schema in set.schemas(registry) {
        report.push(table_status(&schema, connection).await?);
    }
    Ok(report)
}

async fn table_status(
    schema: &ModelSchema,
    connection: &Connection,
) -> Result<TableStatus, DatabaseError> {
    let table = schema.table();
    if !connection.table_exists(table).await? {
        return Ok(TableStatus {
            table: table.to_string(),
            exists: false,
            missing_columns: Vec::new(),
        });
    }
    let mut missing_columns = Vec::new();
    for column in schema.columns() {
        if !connection.column_exists(table, column.name()).await? {
            missing_columns.push(column.name().to_string());
        }
    }
    Ok(TableStatus {
        table: table.to_string(),
        exists: true,
        missing_columns,
    })
}

/// Renders each model's declaration as the `CREATE TABLE` the connection's
/// dialect would issue, followed by its foreign keys when the dialect adds
/// them separately.
#[must_use]
pub fn describe(set: &ModelSet, registry: &SchemaRegistry, connection: &Connection) -> String {
    let dialect = connection.dialect();
    let mut out = String::new();
    for schema in set.schemas(registry) {
        let create = dialect.create_table(schema.table(), schema.columns(), schema.foreign_keys());
        out.push_str(&format!("{create};\n"));
        for statement in schema
            .foreign_keys()
            .iter()
            .filter_map(|fk| dialect.add_foreign_key(fk))
        {
            out.push_str(&format!("{statement};\n"));
        }
        out.push('\n');
    }
    out
}
