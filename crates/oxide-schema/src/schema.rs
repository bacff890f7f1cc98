//! Declarative model setup.
//!
//! [`Model::setup`](crate::model::Model::setup) receives a
//! [`SchemaBuilder`] and registers columns and foreign keys on it, in
//! declaration order. The finished [`ModelSchema`] is computed once per
//! model type and cached by the registry.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnType};
use crate::error::{ReconcileError, Result};
use crate::foreign_key::ForeignKey;
use crate::identifier::validate_identifier;

/// Collects the columns and foreign keys a model declares.
#[derive(Debug)]
pub struct SchemaBuilder {
    table: String,
    columns: Vec<Column>,
    foreign_keys: Vec<ForeignKey>,
}

impl SchemaBuilder {
    /// Creates an empty builder for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Table the model maps to.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Creates a column descriptor owned by this table.
    ///
    /// The column is not declared until passed to
    /// [`register_column`](Self::register_column).
    #[must_use]
    pub fn new_column(&self, name: impl Into<String>, base_type: ColumnType) -> Column {
        Column::new(self.table.clone(), name, base_type)
    }

    /// Declares a column. Declaration order is creation order.
    pub fn register_column(&mut self, column: Column) -> &mut Self {
        self.columns.push(column);
        self
    }

    /// Declares a cascading foreign key from `column` to
    /// `referenced_table.referenced_column`.
    pub fn add_foreign_key(
        &mut self,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> &mut Self {
        self.foreign_keys.push(ForeignKey::new(
            self.table.clone(),
            column,
            referenced_table,
            referenced_column,
        ));
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> ModelSchema {
        ModelSchema {
            table: self.table,
            columns: self.columns,
            foreign_keys: self.foreign_keys,
        }
    }
}

/// The declared schema of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    table: String,
    columns: Vec<Column>,
    foreign_keys: Vec<ForeignKey>,
}

impl ModelSchema {
    /// Table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Declared columns, in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Declared column names, in declaration order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Declared foreign keys, in declaration order.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Tables this model's foreign keys point at, excluding itself.
    #[must_use]
    pub fn referenced_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for fk in self.foreign_keys.iter().filter(|fk| !fk.is_self_reference()) {
            if !tables.contains(&fk.referenced_table()) {
                tables.push(fk.referenced_table());
            }
        }
        tables
    }

    /// Checks every descriptor before any DDL is generated from it.
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table).map_err(|message| ReconcileError::InvalidDescriptor {
            table: self.table.clone(),
            message: format!("invalid table name: {message}"),
        })?;

        let mut seen = HashSet::new();
        for column in &self.columns {
            column.validate()?;
            if column.table() != self.table {
                return Err(ReconcileError::InvalidDescriptor {
                    table: self.table.clone(),
                    message: format!(
                        "column '{}' belongs to table '{}'",
                        column.name(),
                        column.table()
                    ),
                });
            }
            if !seen.insert(column.name()) {
                return Err(ReconcileError::InvalidDescriptor {
                    table: self.table.clone(),
                    message: format!("column '{}' is declared twice", column.name()),
                });
            }
        }

        for fk in &self.foreign_keys {
            fk.validate()?;
            if !seen.contains(fk.column()) {
                return Err(ReconcileError::InvalidDescriptor {
                    table: self.table.clone(),
                    message: format!(
                        "foreign key '{}' uses undeclared column '{}'",
                        fk.constraint_name(),
                        fk.column()
                    ),
                });
            }
        }

        Ok(())
    }
}
