//! MySQL / MariaDB dialect.

use crate::column::{Column, ColumnType};

use super::DdlDialect;

/// MySQL DDL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DdlDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn type_name(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Integer => "INT".to_string(),
            ColumnType::UnsignedInteger => "INT UNSIGNED".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::UnsignedBigInt => "BIGINT UNSIGNED".to_string(),
            ColumnType::Varchar(len) => format!("VARCHAR({len})"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Decimal(p, s) => format!("DECIMAL({p}, {s})"),
            ColumnType::Blob => "BLOB".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Custom(name) => name.clone(),
        }
    }

    fn column_modifiers(&self, column: &Column) -> String {
        let mut parts = Vec::new();

        match column.is_nullable() {
            Some(false) => parts.push("NOT NULL".to_string()),
            Some(true) => parts.push("NULL".to_string()),
            None => {}
        }

        if let Some(default) = column.default_value() {
            parts.push(format!("DEFAULT {}", default.to_sql()));
        }

        if let Some(expr) = column.on_update_expression() {
            parts.push(format!("ON UPDATE {expr}"));
        }

        if column.is_auto_increment() {
            parts.push("AUTO_INCREMENT".to_string());
        }

        if column.is_unique() && !column.is_primary_key() {
            parts.push("UNIQUE".to_string());
        }

        if column.is_primary_key() {
            parts.push("PRIMARY KEY".to_string());
        }

        if let Some(extra) = column.extra_sql() {
            parts.push(extra.to_string());
        }

        parts.join(" ")
    }

    fn supports_add_constraint(&self) -> bool {
        true
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }
}
