//! DDL generation per database engine.
//!
//! Each dialect knows how to spell column types and modifiers and how to
//! build the three statements reconciliation needs: `CREATE TABLE`,
//! `ADD COLUMN` and `ADD CONSTRAINT ... FOREIGN KEY`.

mod mysql;
mod sqlite;

use std::fmt;

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::column::{Column, ColumnType};
use crate::foreign_key::ForeignKey;

/// Structured description of what a [`DdlStatement`] does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlOp {
    /// Create a table with the given columns, in order.
    CreateTable {
        /// Table name.
        table: String,
        /// Column names.
        columns: Vec<String>,
        /// Foreign-key constraints declared inline.
        constraints: Vec<String>,
    },
    /// Add one column to an existing table.
    AddColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
    /// Add a cascading foreign-key constraint.
    AddForeignKey {
        /// Table carrying the constraint.
        table: String,
        /// Constraint name.
        constraint: String,
        /// Local column.
        column: String,
        /// Referenced table.
        referenced_table: String,
        /// Referenced column.
        referenced_column: String,
    },
}

impl DdlOp {
    /// Table the statement alters.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable { table, .. }
            | Self::AddColumn { table, .. }
            | Self::AddForeignKey { table, .. } => table,
        }
    }
}

/// A DDL statement: its rendered SQL plus what it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlStatement {
    /// What the statement does.
    pub op: DdlOp,
    /// Rendered SQL for the target engine.
    pub sql: String,
}

impl fmt::Display for DdlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Trait for engine-specific DDL generation.
pub trait DdlDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the SQL type name for the given type.
    fn type_name(&self, column_type: &ColumnType) -> String;

    /// Renders a column's modifiers (nullability, default, keys).
    fn column_modifiers(&self, column: &Column) -> String;

    /// Returns whether foreign keys can be added to an existing table.
    fn supports_add_constraint(&self) -> bool;

    /// Quote an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Generates the full column definition fragment.
    fn column_definition(&self, column: &Column) -> String {
        let mut sql = format!(
            "{} {}",
            self.quote_identifier(column.name()),
            self.type_name(column.base_type())
        );
        let modifiers = self.column_modifiers(column);
        if !modifiers.is_empty() {
            sql.push(' ');
            sql.push_str(&modifiers);
        }
        sql
    }

    /// Generates `CREATE TABLE` with every column, in declaration order.
    ///
    /// Dialects that cannot add constraints later declare `foreign_keys`
    /// inline; the others ignore them here and add them with
    /// [`add_foreign_key`](Self::add_foreign_key).
    fn create_table(
        &self,
        table: &str,
        columns: &[Column],
        foreign_keys: &[ForeignKey],
    ) -> DdlStatement {
        let mut defs: Vec<String> = columns.iter().map(|c| self.column_definition(c)).collect();
        let inline = if self.supports_add_constraint() {
            &[][..]
        } else {
            foreign_keys
        };
        defs.extend(inline.iter().map(|fk| self.foreign_key_constraint(fk)));
        let sql = format!(
            "CREATE TABLE {} (\n  {}\n)",
            self.quote_identifier(table),
            defs.join(",\n  ")
        );
        DdlStatement {
            op: DdlOp::CreateTable {
                table: table.to_string(),
                columns: columns.iter().map(|c| c.name().to_string()).collect(),
                constraints: inline.iter().map(ForeignKey::constraint_name).collect(),
            },
            sql,
        }
    }

    /// Generates the `CONSTRAINT ... FOREIGN KEY ... REFERENCES` clause,
    /// cascading on delete and update.
    fn foreign_key_constraint(&self, foreign_key: &ForeignKey) -> String {
        format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) \
             ON DELETE CASCADE ON UPDATE CASCADE",
            self.quote_identifier(&foreign_key.constraint_name()),
            self.quote_identifier(foreign_key.column()),
            self.quote_identifier(foreign_key.referenced_table()),
            self.quote_identifier(foreign_key.referenced_column()),
        )
    }

    /// Generates `ALTER TABLE ... ADD COLUMN`.
    fn add_column(&self, table: &str, column: &Column) -> DdlStatement {
        DdlStatement {
            op: DdlOp::AddColumn {
                table: table.to_string(),
                column: column.name().to_string(),
            },
            sql: format!(
                "ALTER TABLE {} ADD COLUMN {}",
                self.quote_identifier(table),
                self.column_definition(column)
            ),
        }
    }

    /// Generates `ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY`.
    ///
    /// Returns `None` when the engine cannot add constraints to an
    /// existing table.
    fn add_foreign_key(&self, foreign_key: &ForeignKey) -> Option<DdlStatement> {
        if !self.supports_add_constraint() {
            return None;
        }
        let sql = format!(
            "ALTER TABLE {} ADD {}",
            self.quote_identifier(foreign_key.table()),
            self.foreign_key_constraint(foreign_key)
        );
        Some(DdlStatement {
            op: DdlOp::AddForeignKey {
                table: foreign_key.table().to_string(),
                constraint: foreign_key.constraint_name(),
                column: foreign_key.column().to_string(),
                referenced_table: foreign_key.referenced_table().to_string(),
                referenced_column: foreign_key.referenced_column().to_string(),
            },
            sql,
        })
    }
}
