//! SQLite dialect.
//!
//! SQLite has no `ALTER TABLE ... ADD CONSTRAINT`; foreign keys can only
//! be declared when a table is created, so `create_table` declares them
//! inline and `add_foreign_key` reports them as unsupported.

use crate::column::{Column, ColumnType};

use super::DdlDialect;

/// SQLite DDL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DdlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_name(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Integer
            | ColumnType::UnsignedInteger
            | ColumnType::BigInt
            | ColumnType::UnsignedBigInt
            | ColumnType::Boolean => "INTEGER".to_string(),
            ColumnType::Varchar(_)
            | ColumnType::Text
            | ColumnType::Timestamp
            | ColumnType::DateTime
            | ColumnType::Date
            | ColumnType::Json => "TEXT".to_string(),
            ColumnType::Double => "REAL".to_string(),
            ColumnType::Decimal(_, _) => "NUMERIC".to_string(),
            ColumnType::Blob => "BLOB".to_string(),
            ColumnType::Custom(name) => name.clone(),
        }
    }

    fn column_modifiers(&self, column: &Column) -> String {
        let mut parts = Vec::new();

        if column.is_primary_key() {
            parts.push("PRIMARY KEY".to_string());
            if column.is_auto_increment() {
                parts.push("AUTOINCREMENT".to_string());
            }
        }

        match column.is_nullable() {
            Some(false) if !column.is_primary_key() => parts.push("NOT NULL".to_string()),
            Some(true) => parts.push("NULL".to_string()),
            _ => {}
        }

        if column.is_unique() && !column.is_primary_key() {
            parts.push("UNIQUE".to_string());
        }

        if let Some(default) = column.default_value() {
            parts.push(format!("DEFAULT {}", default.to_sql()));
        }

        if let Some(extra) = column.extra_sql() {
            parts.push(extra.to_string());
        }

        parts.join(" ")
    }

    fn supports_add_constraint(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::DefaultValue;
    use crate::dialect::DdlOp;
    use crate::foreign_key::ForeignKey;

    fn dialect() -> SqliteDialect {
        SqliteDialect::new()
    }

    #[test]
    fn test_create_table() {
        let columns = vec![
            Column::new("user", "id", ColumnType::UnsignedInteger)
                .not_null()
                .primary_key()
                .auto_increment(),
            Column::new("user", "name", ColumnType::Varchar(255)).not_null(),
        ];
        let stmt = dialect().create_table("user", &columns, &[]);
        assert_eq!(
            stmt.sql,
            "CREATE TABLE \"user\" (\n  \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,\n  \"name\" TEXT NOT NULL\n)"
        );
    }

    #[test]
    fn test_add_column_with_default() {
        let col = Column::new("user", "is_active", ColumnType::Boolean)
            .not_null()
            .default(DefaultValue::Bool(true));
        let stmt = dialect().add_column("user", &col);
        assert_eq!(
            stmt.sql,
            "ALTER TABLE \"user\" ADD COLUMN \"is_active\" INTEGER NOT NULL DEFAULT 1"
        );
    }

    #[test]
    fn test_on_update_is_ignored() {
        let col = Column::new("user", "updated_at", ColumnType::Timestamp)
            .default(DefaultValue::Expression("CURRENT_TIMESTAMP".into()))
            .on_update("CURRENT_TIMESTAMP");
        assert_eq!(
            dialect().column_definition(&col),
            "\"updated_at\" TEXT DEFAULT CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_foreign_keys_unsupported() {
        let fk = ForeignKey::new("post", "user_id", "user", "id");
        assert!(dialect().add_foreign_key(&fk).is_none());
    }

    #[test]
    fn test_create_table_declares_foreign_keys_inline() {
        let columns = vec![
            Column::new("post", "id", ColumnType::Integer).primary_key(),
            Column::new("post", "user_id", ColumnType::Integer).not_null(),
        ];
        let fks = vec![ForeignKey::new("post", "user_id", "user", "id")];
        let stmt = dialect().create_table("post", &columns, &fks);
        assert_eq!(
            stmt.sql,
            "CREATE TABLE \"post\" (\n  \"id\" INTEGER PRIMARY KEY,\n  \"user_id\" INTEGER NOT NULL,\n  \
             CONSTRAINT \"fk_post_user_id\" FOREIGN KEY (\"user_id\") REFERENCES \"user\" (\"id\") \
             ON DELETE CASCADE ON UPDATE CASCADE\n)"
        );
        assert_eq!(
            stmt.op,
            DdlOp::CreateTable {
                table: "post".into(),
                columns: vec!["id".into(), "user_id".into()],
                constraints: vec!["fk_post_user_id".into()],
            }
        );
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(dialect().quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
